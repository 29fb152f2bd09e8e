//! Per-axis position state machine
//!
//! Each controlled arm axis tracks a current and a target position in
//! degrees. Targets are always clamped into the axis bounds, and the current
//! position moves towards the target according to the axis's response
//! policy.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How an axis's current position responds to a change of target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePolicy {
    /// The current position jumps to the target in a single tick.
    Snap,

    /// The current position moves towards the target at a bounded rate,
    /// never overshooting it.
    Slew {
        /// Highest rate at which the current position may change.
        ///
        /// Units: degrees/second
        max_rate_dps: f64,
    },
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The state of a single controlled arm axis.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AxisState {
    /// The position the axis is currently commanded to.
    ///
    /// Units: degrees
    pub current_deg: f64,

    /// The position the axis is moving towards.
    ///
    /// Units: degrees
    pub target_deg: f64,

    min_deg: f64,
    max_deg: f64,

    policy: ResponsePolicy,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ResponsePolicy {
    fn default() -> Self {
        ResponsePolicy::Snap
    }
}

impl Default for AxisState {
    fn default() -> Self {
        AxisState::new(0.0, 0.0, 0.0, ResponsePolicy::Snap)
    }
}

impl AxisState {
    /// Create a new axis at the given start position.
    ///
    /// The start position is clamped into the bounds.
    pub fn new(
        start_deg: f64,
        min_deg: f64,
        max_deg: f64,
        policy: ResponsePolicy,
    ) -> Self {
        let start_deg = start_deg.clamp(min_deg, max_deg);

        AxisState {
            current_deg: start_deg,
            target_deg: start_deg,
            min_deg,
            max_deg,
            policy,
        }
    }

    /// Set a new target position, clamped into the axis bounds.
    ///
    /// Returns true if the requested target had to be limited.
    pub fn set_target(&mut self, target_deg: f64) -> bool {
        self.target_deg = target_deg.clamp(self.min_deg, self.max_deg);
        self.target_deg != target_deg
    }

    /// Shift the target position by a delta, clamped into the axis bounds.
    ///
    /// Returns true if the resulting target had to be limited.
    pub fn nudge_target(&mut self, delta_deg: f64) -> bool {
        self.set_target(self.target_deg + delta_deg)
    }

    /// Advance the current position one tick towards the target.
    pub fn step(&mut self, dt_s: f64) {
        match self.policy {
            ResponsePolicy::Snap => {
                self.current_deg = self.target_deg;
            }
            ResponsePolicy::Slew { max_rate_dps } => {
                // Error clamped to one tick's travel, no overshoot possible
                let max_step_deg = max_rate_dps * dt_s;
                let error_deg = self.target_deg - self.current_deg;
                self.current_deg += error_deg.clamp(-max_step_deg, max_step_deg);
            }
        }
    }

    /// True if the current position has reached the target.
    pub fn is_settled(&self) -> bool {
        (self.current_deg - self.target_deg).abs() < 1e-9
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
