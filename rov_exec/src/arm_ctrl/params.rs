//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::axis::ResponsePolicy;
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {

    // ---- OPERATOR INPUT ----

    /// Normalised trigger value above which a claw trigger counts as pulled.
    pub trigger_threshold: f64,

    // ---- CLAW AXIS ----

    /// Claw position when fully closed.
    ///
    /// Units: degrees
    pub claw_closed_deg: f64,

    /// Claw position when fully open.
    ///
    /// Units: degrees
    pub claw_open_deg: f64,

    /// Lower claw position bound.
    ///
    /// Units: degrees
    pub claw_min_deg: f64,

    /// Upper claw position bound.
    ///
    /// Units: degrees
    pub claw_max_deg: f64,

    /// How the claw responds to a change of target.
    pub claw_policy: ResponsePolicy,

    // ---- ROLL AXIS ----

    /// Roll position at startup.
    ///
    /// Units: degrees
    pub roll_start_deg: f64,

    /// Lower roll position bound.
    ///
    /// Units: degrees
    pub roll_min_deg: f64,

    /// Upper roll position bound.
    ///
    /// Units: degrees
    pub roll_max_deg: f64,

    /// Target change applied for each tick a roll bumper is held.
    ///
    /// Units: degrees
    pub roll_step_deg: f64,

    /// How the roll axis responds to a change of target.
    pub roll_policy: ResponsePolicy,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised when validating loaded parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("The {0} axis bounds [{1}, {2}] deg are invalid, expected min < max")]
    InvalidBounds(&'static str, f64, f64),

    #[error("The claw positions (closed {0} deg, open {1} deg) lie outside the claw bounds")]
    ClawPositionsOutOfBounds(f64, f64),

    #[error("The roll start position {0} deg lies outside the roll bounds")]
    RollStartOutOfBounds(f64),

    #[error("The trigger threshold must be in (0, 1], found {0}")]
    InvalidTriggerThreshold(f64),

    #[error("The roll step must be non-negative, found {0} deg")]
    NegativeRollStep(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the loaded parameters are self-consistent.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if self.claw_min_deg >= self.claw_max_deg {
            return Err(ParamsError::InvalidBounds(
                "claw",
                self.claw_min_deg,
                self.claw_max_deg,
            ));
        }

        if self.roll_min_deg >= self.roll_max_deg {
            return Err(ParamsError::InvalidBounds(
                "roll",
                self.roll_min_deg,
                self.roll_max_deg,
            ));
        }

        let claw_in_bounds = |pos: f64| pos >= self.claw_min_deg && pos <= self.claw_max_deg;

        if !claw_in_bounds(self.claw_closed_deg) || !claw_in_bounds(self.claw_open_deg) {
            return Err(ParamsError::ClawPositionsOutOfBounds(
                self.claw_closed_deg,
                self.claw_open_deg,
            ));
        }

        if self.roll_start_deg < self.roll_min_deg || self.roll_start_deg > self.roll_max_deg {
            return Err(ParamsError::RollStartOutOfBounds(self.roll_start_deg));
        }

        if self.trigger_threshold <= 0.0 || self.trigger_threshold > 1.0 {
            return Err(ParamsError::InvalidTriggerThreshold(self.trigger_threshold));
        }

        if self.roll_step_deg < 0.0 {
            return Err(ParamsError::NegativeRollStep(self.roll_step_deg));
        }

        Ok(())
    }
}
