//! Outbound command gating
//!
//! The microcontroller sits on a slow servo bus and must not be flooded with
//! redundant or rapid-fire commands. The gate suppresses a candidate command
//! if its value matches the last one sent for that actuator, and optionally
//! if too little time has passed since the last arm command.
//!
//! The time rule covers the arm servos only. The six pulse widths produced
//! by one manoeuvre intent must land on the microcontroller together, a
//! thruster set applied one actuator per delay window would put transient
//! uncommanded moments on the vehicle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::HashMap;
use std::time::{Duration, Instant};

// Internal
use comms_if::eqpt::ActId;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Decides whether a candidate actuator command may be emitted.
///
/// Checking and recording are separate so that a failed serial write does
/// not count as an emission, letting the next cycle re-send the same value.
#[derive(Default)]
pub struct CmdGate {
    value_gating: bool,
    time_gating: bool,
    command_delay: Duration,

    /// Last wire value sent per actuator.
    last_sent: HashMap<ActId, i64>,

    /// Time of the last accepted arm command, of either axis.
    last_arm_emission: Option<Instant>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdGate {
    pub fn new(value_gating: bool, time_gating: bool, command_delay: Duration) -> Self {
        CmdGate {
            value_gating,
            time_gating,
            command_delay,
            last_sent: HashMap::new(),
            last_arm_emission: None,
        }
    }

    /// True if a command with this wire value may be emitted now.
    ///
    /// Thruster commands are only subject to value gating, the time rule
    /// paces the arm servos alone.
    pub fn permits(&self, act_id: ActId, wire_value: i64, now: Instant) -> bool {
        if self.value_gating && self.last_sent.get(&act_id) == Some(&wire_value) {
            return false;
        }

        if self.time_gating && act_id.is_arm_axis() {
            if let Some(last) = self.last_arm_emission {
                if now.saturating_duration_since(last) < self.command_delay {
                    return false;
                }
            }
        }

        true
    }

    /// Record that a command was successfully emitted.
    pub fn record(&mut self, act_id: ActId, wire_value: i64, now: Instant) {
        self.last_sent.insert(act_id, wire_value);

        if act_id.is_arm_axis() {
            self.last_arm_emission = Some(now);
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_repeated_value_suppressed() {
        let mut gate = CmdGate::new(true, false, Duration::from_millis(0));
        let now = Instant::now();

        assert!(gate.permits(ActId::ArmClaw, 180, now));
        gate.record(ActId::ArmClaw, 180, now);

        // Same value for the same actuator is suppressed at any time gap
        assert!(!gate.permits(ActId::ArmClaw, 180, now));
        assert!(!gate.permits(
            ActId::ArmClaw,
            180,
            now + Duration::from_secs(10)
        ));

        // A different value, or another actuator, passes
        assert!(gate.permits(ActId::ArmClaw, 90, now));
        assert!(gate.permits(ActId::ArmRoll, 180, now));
    }

    #[test]
    fn test_time_gating_suppresses_across_arm_axes() {
        let mut gate = CmdGate::new(true, true, Duration::from_millis(100));
        let now = Instant::now();

        assert!(gate.permits(ActId::ArmClaw, 180, now));
        gate.record(ActId::ArmClaw, 180, now);

        // A differing value inside the delay window is still suppressed, even
        // on the other arm axis
        let early = now + Duration::from_millis(50);
        assert!(!gate.permits(ActId::ArmClaw, 90, early));
        assert!(!gate.permits(ActId::ArmRoll, 110, early));

        // Once the delay has elapsed it passes
        let late = now + Duration::from_millis(100);
        assert!(gate.permits(ActId::ArmClaw, 90, late));
    }

    #[test]
    fn test_thrusters_exempt_from_time_gating() {
        let mut gate = CmdGate::new(true, true, Duration::from_millis(100));
        let now = Instant::now();

        // A fresh arm emission opens a delay window
        gate.record(ActId::ArmClaw, 180, now);

        // Thruster commands pass inside the window, back to back
        assert!(gate.permits(ActId::ThrFr, 1650, now));
        gate.record(ActId::ThrFr, 1650, now);
        assert!(gate.permits(ActId::ThrFl, 1650, now));

        // And a thruster emission does not open a window of its own
        assert!(!gate.permits(ActId::ArmRoll, 110, now));
        assert!(gate.permits(
            ActId::ArmRoll,
            110,
            now + Duration::from_millis(100)
        ));

        // Value gating still covers thrusters
        assert!(!gate.permits(ActId::ThrFr, 1650, now));
    }

    #[test]
    fn test_value_gating_alone_ignores_time() {
        let mut gate = CmdGate::new(true, false, Duration::from_millis(100));
        let now = Instant::now();

        gate.record(ActId::ArmRoll, 90, now);

        // Back to back differing values both pass without time gating
        assert!(gate.permits(ActId::ArmRoll, 91, now));
        gate.record(ActId::ArmRoll, 91, now);
        assert!(gate.permits(ActId::ArmRoll, 92, now));
    }

    #[test]
    fn test_time_gating_alone_allows_repeats() {
        let mut gate = CmdGate::new(false, true, Duration::from_millis(100));
        let now = Instant::now();

        gate.record(ActId::ArmClaw, 180, now);

        // Without value gating even an identical value passes once the
        // delay has elapsed
        assert!(!gate.permits(ActId::ArmClaw, 180, now + Duration::from_millis(50)));
        assert!(gate.permits(ActId::ArmClaw, 180, now + Duration::from_millis(100)));
    }

    #[test]
    fn test_unrecorded_emission_not_counted() {
        let mut gate = CmdGate::new(true, true, Duration::from_millis(100));
        let now = Instant::now();

        // permits() alone must not update the gate: a write failure means
        // the same command is free to go again next cycle
        assert!(gate.permits(ActId::ArmClaw, 180, now));
        assert!(gate.permits(ActId::ArmClaw, 180, now));

        gate.record(ActId::ArmClaw, 180, now);
        assert!(!gate.permits(ActId::ArmClaw, 180, now));
    }
}
