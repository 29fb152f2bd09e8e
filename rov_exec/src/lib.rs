//! # ROV library.
//!
//! This library allows other crates in the workspace (and the benches) to
//! access items defined inside the rov crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm control module - converts operator inputs into claw and roll servo demands
pub mod arm_ctrl;

/// Global data store for the executable
pub mod data_store;

/// Serial driver - gates, serialises and writes actuator demands to the vehicle
pub mod serial_driver;

/// Telecommand processor - routes TCs from any source into the data store
pub mod tc_processor;

/// Thruster control module - converts high level manoeuvre commands into thruster pulse widths
pub mod thr_ctrl;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one cycle.
pub const CYCLE_PERIOD_S: f64 = 1.0 / 60.0;

/// Number of cycles per second
pub const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;
