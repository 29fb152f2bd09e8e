//! Parameters structure for SerialDriver

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the Serial driver.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {

    // ---- MASTER SWITCH ----

    /// When false the port is never opened and commands are logged instead
    /// of sent. Useful for dry runs away from the vehicle.
    pub send_serial: bool,

    // ---- PORT ----

    /// Name of the serial port the microcontroller is attached to, for
    /// example `/dev/ttyACM0`.
    pub port_name: String,

    /// Baud rate of the serial link.
    pub baud_rate: u32,

    // ---- COMMAND GATING ----

    /// Suppress commands whose value matches the last one sent for the same
    /// actuator.
    pub value_gating: bool,

    /// Suppress any arm command issued less than `command_delay_ms` after
    /// the last accepted arm emission. Thruster commands are exempt, the
    /// pulse widths of one manoeuvre intent must land together.
    pub time_gating: bool,

    /// Minimum gap between accepted arm emissions when time gating is on.
    ///
    /// Units: milliseconds
    pub command_delay_ms: u64,

    // ---- PACING ----

    /// Fixed pause after each successful write, pacing the downstream
    /// microcontroller. Zero disables the pause.
    ///
    /// Units: milliseconds
    pub serial_delay_ms: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised when validating loaded parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("The baud rate must be non-zero")]
    ZeroBaudRate,

    #[error("Time gating is enabled but the command delay is zero")]
    ZeroCommandDelay,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the loaded parameters are self-consistent.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if self.baud_rate == 0 {
            return Err(ParamsError::ZeroBaudRate);
        }

        if self.time_gating && self.command_delay_ms == 0 {
            return Err(ParamsError::ZeroCommandDelay);
        }

        Ok(())
    }
}
