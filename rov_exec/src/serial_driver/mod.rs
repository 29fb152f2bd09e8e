//! Serial driver module
//!
//! This module interfaces with the vehicle's microcontroller over a serial
//! link. It takes the demands produced by thruster control and arm control,
//! gates them to avoid flooding the link, serialises them into the
//! `"<name>:<value>\n"` wire format and writes them to the port.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd_gate;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd_gate::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SerialDriver operation.
#[derive(Debug, thiserror::Error)]
pub enum SerialDriverError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Loaded parameters are invalid: {0}")]
    ParamsInvalid(ParamsError),

    #[error("Failed to open serial port: {0}")]
    PortOpenFailed(serialport::Error),

    #[error("proc() was called before the module was initialised")]
    NotInitialised,
}
