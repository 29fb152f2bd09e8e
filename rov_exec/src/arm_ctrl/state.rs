//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;
use std::collections::HashMap;

// Internal
use super::{AxisState, Params, NUM_ARM_AXES};
use comms_if::{
    eqpt::{ActId, ArmDems},
    tc::arm::ArmInputs,
};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
#[derive(Default)]
pub struct ArmCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    /// The operator inputs currently in effect. A held trigger or bumper
    /// remains in effect until new inputs arrive.
    pub(crate) current_inputs: Option<ArmInputs>,

    pub(crate) claw: AxisState,
    pub(crate) roll: AxisState,
    arch_axes: Archiver,

    pub(crate) output: Option<ArmDems>,
}

/// Input data to Arm Control.
#[derive(Default)]
pub struct InputData {
    /// New operator inputs, or `None` if there are no new inputs on this
    /// cycle.
    pub inputs: Option<ArmInputs>,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Debug)]
pub struct StatusReport {
    /// Flag for each axis (claw then roll) which is raised if its target had
    /// to be clamped into the axis bounds on this cycle.
    pub target_limited: [bool; NUM_ARM_AXES],
}

/// Flat snapshot of both axes for csv archiving.
#[derive(Clone, Copy, Serialize)]
struct AxesSnapshot {
    claw_current_deg: f64,
    claw_target_deg: f64,
    roll_current_deg: f64,
    roll_target_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ArmCtrl {
    type InitData = &'static str;
    type InitError = super::ArmCtrlError;

    type InputData = InputData;
    type OutputData = ArmDems;
    type StatusReport = StatusReport;
    type ProcError = super::ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = params::load(init_data)
            .map_err(super::ArmCtrlError::ParamLoadError)?;

        // Validate them before building the axes
        self.params
            .are_valid()
            .map_err(super::ArmCtrlError::ParamsInvalid)?;

        // Build the axes at their start positions. The claw starts closed.
        self.claw = AxisState::new(
            self.params.claw_closed_deg,
            self.params.claw_min_deg,
            self.params.claw_max_deg,
            self.params.claw_policy,
        );
        self.roll = AxisState::new(
            self.params.roll_start_deg,
            self.params.roll_min_deg,
            self.params.roll_max_deg,
            self.params.roll_policy,
        );

        // Create the arch folder for arm_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("arm_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archiver
        self.arch_axes = Archiver::from_path(
            session, "arm_ctrl/axes.csv"
        ).unwrap();

        Ok(())
    }

    /// Perform cyclic processing of Arm Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        // Check to see if there are new inputs
        if let Some(inputs) = input_data.inputs {
            self.current_inputs = Some(inputs);

            debug!("New ArmCtrl inputs: {:?}", inputs);
        }

        // Update the axis targets from the inputs in effect
        if let Some(inputs) = self.current_inputs {
            // Claw is bang-bang on the triggers, with close taking precedence
            // if both triggers are pulled at once.
            if inputs.close_trigger > self.params.trigger_threshold {
                self.report.target_limited[0] |=
                    self.claw.set_target(self.params.claw_closed_deg);
            } else if inputs.open_trigger > self.params.trigger_threshold {
                self.report.target_limited[0] |=
                    self.claw.set_target(self.params.claw_open_deg);
            }

            // Roll steps while a bumper is held. Holding both cancels out.
            if inputs.roll_neg {
                self.report.target_limited[1] |=
                    self.roll.nudge_target(-self.params.roll_step_deg);
            }
            if inputs.roll_pos {
                self.report.target_limited[1] |=
                    self.roll.nudge_target(self.params.roll_step_deg);
            }
        }

        // Advance both axes one tick
        self.claw.step(crate::CYCLE_PERIOD_S);
        self.roll.step(crate::CYCLE_PERIOD_S);

        // Build the output demands
        let mut pos_deg = HashMap::new();
        pos_deg.insert(ActId::ArmClaw, self.claw.current_deg);
        pos_deg.insert(ActId::ArmRoll, self.roll.current_deg);

        let output = ArmDems { pos_deg };

        trace!(
            "ArmCtrl output: claw {:.1} deg, roll {:.1} deg",
            self.claw.current_deg,
            self.roll.current_deg
        );

        // Update the output in self
        self.output = Some(output.clone());

        Ok((output, self.report))
    }
}

impl Archived for ArmCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_axes.serialise(AxesSnapshot {
            claw_current_deg: self.claw.current_deg,
            claw_target_deg: self.claw.target_deg,
            roll_current_deg: self.roll.current_deg,
            roll_target_deg: self.roll.target_deg,
        })?;

        Ok(())
    }
}

impl ArmCtrl {
    /// Function called when entering safe mode.
    ///
    /// Must result in no motion of the arm: held inputs are discarded and
    /// both axes freeze at their current positions.
    pub fn make_safe(&mut self) {
        self.current_inputs = None;

        self.claw.set_target(self.claw.current_deg);
        self.roll.set_target(self.roll.current_deg);
    }

    /// Build an ArmCtrl from in-memory params, without touching the
    /// filesystem.
    #[cfg(test)]
    pub(crate) fn with_params(params: Params) -> Self {
        let claw = AxisState::new(
            params.claw_closed_deg,
            params.claw_min_deg,
            params.claw_max_deg,
            params.claw_policy,
        );
        let roll = AxisState::new(
            params.roll_start_deg,
            params.roll_min_deg,
            params.roll_max_deg,
            params.roll_policy,
        );

        ArmCtrl {
            params,
            claw,
            roll,
            ..ArmCtrl::default()
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use super::super::ResponsePolicy;

    /// Build an ArmCtrl without touching the filesystem.
    fn test_arm_ctrl() -> ArmCtrl {
        ArmCtrl::with_params(Params {
            trigger_threshold: 0.9,
            claw_closed_deg: 90.0,
            claw_open_deg: 180.0,
            claw_min_deg: 90.0,
            claw_max_deg: 180.0,
            claw_policy: ResponsePolicy::Snap,
            roll_start_deg: 90.0,
            roll_min_deg: 0.0,
            roll_max_deg: 180.0,
            roll_step_deg: 1.0,
            roll_policy: ResponsePolicy::Slew { max_rate_dps: 60.0 },
        })
    }

    fn claw_deg(dems: &ArmDems) -> f64 {
        dems.pos_deg[&ActId::ArmClaw]
    }

    fn roll_deg(dems: &ArmDems) -> f64 {
        dems.pos_deg[&ActId::ArmRoll]
    }

    #[test]
    fn test_claw_snaps_open_on_trigger() {
        let mut arm_ctrl = test_arm_ctrl();

        let inputs = ArmInputs {
            open_trigger: 1.0,
            ..ArmInputs::default()
        };

        let (output, _) = arm_ctrl
            .proc(&InputData { inputs: Some(inputs) })
            .unwrap();

        assert_eq!(claw_deg(&output), 180.0);
    }

    #[test]
    fn test_claw_ignores_trigger_below_threshold() {
        let mut arm_ctrl = test_arm_ctrl();

        let inputs = ArmInputs {
            open_trigger: 0.5,
            ..ArmInputs::default()
        };

        let (output, _) = arm_ctrl
            .proc(&InputData { inputs: Some(inputs) })
            .unwrap();

        assert_eq!(claw_deg(&output), 90.0);
    }

    #[test]
    fn test_close_takes_precedence_over_open() {
        let mut arm_ctrl = test_arm_ctrl();

        // Open the claw first
        let inputs = ArmInputs {
            open_trigger: 1.0,
            ..ArmInputs::default()
        };
        arm_ctrl.proc(&InputData { inputs: Some(inputs) }).unwrap();

        // Both triggers pulled at once closes it
        let inputs = ArmInputs {
            close_trigger: 1.0,
            open_trigger: 1.0,
            ..ArmInputs::default()
        };
        let (output, _) = arm_ctrl
            .proc(&InputData { inputs: Some(inputs) })
            .unwrap();

        assert_eq!(claw_deg(&output), 90.0);
    }

    #[test]
    fn test_roll_steps_while_bumper_held() {
        let mut arm_ctrl = test_arm_ctrl();

        let inputs = ArmInputs {
            roll_pos: true,
            ..ArmInputs::default()
        };

        // The bumper is reported once and persists, so the target keeps
        // stepping on cycles with no new inputs.
        let mut output = arm_ctrl
            .proc(&InputData { inputs: Some(inputs) })
            .unwrap()
            .0;
        for _ in 0..19 {
            output = arm_ctrl.proc(&InputData { inputs: None }).unwrap().0;
        }

        // 20 ticks at 1 deg/tick from 90
        assert!((roll_deg(&output) - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_roll_clamped_at_bounds() {
        let mut arm_ctrl = test_arm_ctrl();

        let inputs = ArmInputs {
            roll_pos: true,
            ..ArmInputs::default()
        };
        arm_ctrl.proc(&InputData { inputs: Some(inputs) }).unwrap();

        let mut report = StatusReport::default();
        let mut output = ArmDems::default();
        for _ in 0..200 {
            let (o, r) = arm_ctrl.proc(&InputData { inputs: None }).unwrap();
            output = o;
            report = r;
        }

        assert!((roll_deg(&output) - 180.0).abs() < 1e-9);
        assert!(report.target_limited[1]);
    }

    #[test]
    fn test_make_safe_freezes_axes() {
        let mut arm_ctrl = test_arm_ctrl();

        let inputs = ArmInputs {
            roll_pos: true,
            ..ArmInputs::default()
        };
        arm_ctrl.proc(&InputData { inputs: Some(inputs) }).unwrap();

        arm_ctrl.make_safe();

        let before = arm_ctrl.roll.current_deg;
        let (output, _) = arm_ctrl.proc(&InputData { inputs: None }).unwrap();

        assert!((roll_deg(&output) - before).abs() < 1e-9);
    }
}
