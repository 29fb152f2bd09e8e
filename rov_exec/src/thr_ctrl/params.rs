//! Parameters structure for ThrCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use thiserror::Error;
use super::{NUM_DOFS, NUM_THRUSTERS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Thruster control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {

    // ---- MIXING ----

    /// The mixing matrix rows, one per thruster in
    /// `comms_if::eqpt::THRUSTER_IDS` order.
    ///
    /// Columns correspond 1:1 to the degrees of freedom in the fixed order
    /// surge, sway, heave, yaw. Coefficients are expected in {-1, 0, 1}.
    pub mixing_matrix: [[f64; NUM_DOFS]; NUM_THRUSTERS],

    // ---- PULSE WIDTH TRANSFORM ----

    /// Pulse width commanding zero thrust.
    ///
    /// Units: microseconds
    pub centre_pw_us: f64,

    /// Pulse width deviation from centre for a unit mixer output.
    ///
    /// Units: microseconds
    pub scale_pw_us: f64,

    // ---- SAFETY BAND ----

    /// Lowest pulse width that may ever be commanded.
    ///
    /// Units: microseconds
    pub min_pw_us: f64,

    /// Highest pulse width that may ever be commanded.
    ///
    /// Units: microseconds
    pub max_pw_us: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised when validating loaded parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error(
        "The safety band [{0}, {1}] us is invalid, expected min < max with \
        the centre pulse width inside the band"
    )]
    InvalidSafetyBand(f64, f64),

    #[error("The pulse width scale must be non-negative, found {0} us")]
    NegativeScale(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the loaded parameters are self-consistent.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if self.min_pw_us >= self.max_pw_us
            || self.centre_pw_us < self.min_pw_us
            || self.centre_pw_us > self.max_pw_us
        {
            return Err(ParamsError::InvalidSafetyBand(
                self.min_pw_us,
                self.max_pw_us,
            ));
        }

        if self.scale_pw_us < 0.0 {
            return Err(ParamsError::NegativeScale(self.scale_pw_us));
        }

        Ok(())
    }
}
