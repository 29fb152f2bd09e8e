//! Thruster control module

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod mixer;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use mixer::*;
pub use params::*;
pub use state::*;

// Re-export so users of the module don't need to reach into comms_if
pub use comms_if::eqpt::NUM_THRUSTERS;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of degrees of freedom the mixer accepts, in column order
/// surge, sway, heave, yaw.
pub const NUM_DOFS: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ThrCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ThrCtrlError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Loaded parameters are invalid: {0}")]
    ParamsInvalid(ParamsError),

    #[error("proc() was called before the module was initialised")]
    NotInitialised,
}
