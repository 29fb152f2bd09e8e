//! # Arm control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Normalised operator inputs driving the arm.
///
/// These persist between telecommands: a held trigger or bumper is reported
/// once and remains in effect until a new `ArmInputs` TC replaces it.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, StructOpt)]
pub struct ArmInputs {
    /// Claw-close trigger axis, in `[0, 1]`.
    ///
    /// Crossing the configured threshold snaps the claw target to its closed
    /// angle.
    pub close_trigger: f64,

    /// Claw-open trigger axis, in `[0, 1]`.
    ///
    /// Crossing the configured threshold snaps the claw target to its open
    /// angle.
    pub open_trigger: f64,

    /// Roll-negative bumper. While held the roll target steps downwards each
    /// cycle.
    #[structopt(parse(try_from_str))]
    pub roll_neg: bool,

    /// Roll-positive bumper. While held the roll target steps upwards each
    /// cycle.
    #[structopt(parse(try_from_str))]
    pub roll_pos: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ArmInputs {
    fn default() -> Self {
        ArmInputs {
            close_trigger: 0.0,
            open_trigger: 0.0,
            roll_neg: false,
            roll_pos: false,
        }
    }
}
