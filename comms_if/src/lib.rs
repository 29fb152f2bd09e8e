//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software: the
//! telecommands accepted by `rov_exec` and the demand types sent to the
//! vehicle's actuators.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Command definitions for equipment (thrusters and arm servos)
pub mod eqpt;
