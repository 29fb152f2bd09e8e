//! # Equipment Commands
//!
//! Demand types for the vehicle's actuators and the wire-level command
//! format accepted by the downstream microcontroller. The microcontroller
//! speaks a line-delimited fire-and-forget protocol: each command is
//! `"<name>:<value>\n"`, UTF-8 encoded, with no acknowledgement read back.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of thrusters on the vehicle.
pub const NUM_THRUSTERS: usize = 6;

/// The number of controlled arm axes.
pub const NUM_ARM_AXES: usize = 2;

/// All thruster actuators, in mixing-matrix row order.
pub const THRUSTER_IDS: [ActId; NUM_THRUSTERS] = [
    ActId::ThrFr,
    ActId::ThrFl,
    ActId::ThrBr,
    ActId::ThrBl,
    ActId::ThrF,
    ActId::ThrB,
];

/// All arm actuators.
pub const ARM_IDS: [ActId; NUM_ARM_AXES] = [ActId::ArmClaw, ActId::ArmRoll];

/// Neutral pulse width commanded to a thruster producing no thrust.
pub const NEUTRAL_PULSE_WIDTH_US: u16 = 1500;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all actuators available to the vehicle
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    /// Front right horizontal thruster
    ThrFr,
    /// Front left horizontal thruster
    ThrFl,
    /// Back right horizontal thruster
    ThrBr,
    /// Back left horizontal thruster
    ThrBl,
    /// Front vertical thruster
    ThrF,
    /// Back vertical thruster
    ThrB,
    /// Claw open/close servo
    ArmClaw,
    /// Claw roll servo
    ArmRoll,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pulse width demands for all thrusters, one entry per thruster in
/// [`THRUSTER_IDS`] order.
///
/// Invariant: every pulse width lies within the safety band configured in
/// thruster control, clamped post-mix.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct ThrusterDems {
    /// Demanded pulse width of each thruster.
    ///
    /// Units: microseconds
    pub pulse_width_us: [u16; NUM_THRUSTERS],
}

/// Angular position demands for the arm servos.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ArmDems {
    /// The demanded position of each arm actuator.
    ///
    /// Units: degrees
    pub pos_deg: HashMap<ActId, f64>,
}

/// A single wire-level actuator command.
///
/// Constructed fresh for every emission and handed straight to the serial
/// sink, never retained.
#[derive(Debug, Copy, Clone)]
pub struct ActCmd {
    pub act_id: ActId,
    pub value: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ActId {
    /// The name of this actuator on the serial wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ActId::ThrFr => "FR",
            ActId::ThrFl => "FL",
            ActId::ThrBr => "BR",
            ActId::ThrBl => "BL",
            ActId::ThrF => "F",
            ActId::ThrB => "B",
            ActId::ArmClaw => "claw",
            ActId::ArmRoll => "roll",
        }
    }

    /// True if this actuator is one of the arm servos.
    pub fn is_arm_axis(&self) -> bool {
        matches!(self, ActId::ArmClaw | ActId::ArmRoll)
    }
}

impl Default for ThrusterDems {
    fn default() -> Self {
        Self {
            pulse_width_us: [NEUTRAL_PULSE_WIDTH_US; NUM_THRUSTERS],
        }
    }
}

impl ActCmd {
    /// Serialise this command into its wire format, `"<name>:<value>\n"`.
    ///
    /// The value is rounded to the nearest integer, as the microcontroller
    /// only accepts integral servo angles and pulse widths.
    pub fn to_line(&self) -> String {
        format!("{}:{}\n", self.act_id.wire_name(), self.value.round() as i64)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_act_cmd_to_line() {
        let cmd = ActCmd {
            act_id: ActId::ArmClaw,
            value: 180.0,
        };
        assert_eq!(cmd.to_line(), "claw:180\n");

        let cmd = ActCmd {
            act_id: ActId::ThrFr,
            value: 1649.6,
        };
        assert_eq!(cmd.to_line(), "FR:1650\n");
    }

    #[test]
    fn test_thruster_dems_default_is_neutral() {
        let dems = ThrusterDems::default();
        assert!(dems
            .pulse_width_us
            .iter()
            .all(|&pw| pw == NEUTRAL_PULSE_WIDTH_US));
    }
}
