//! Implementations for the ThrCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Matrix6x4;
use serde::Serialize;

// Internal
use super::{mixer, Params, ThrCtrlError, NUM_THRUSTERS};
use comms_if::{eqpt::ThrusterDems, tc::mnvr::MnvrCmd};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Thruster control module state
#[derive(Default)]
pub struct ThrCtrl {
    pub(crate) params: Params,

    /// Mixing matrix built from the params at init.
    pub(crate) matrix: Option<Matrix6x4<f64>>,

    pub(crate) report: StatusReport,

    pub(crate) current_cmd: Option<MnvrCmd>,

    pub(crate) output: Option<ThrusterDems>,
    arch_output: Archiver,
}

/// Input data to Thruster Control.
#[derive(Default)]
pub struct InputData {
    /// The manoeuvre command to be executed, or `None` if there is no new
    /// command on this cycle.
    pub cmd: Option<MnvrCmd>,
}

/// Status report for ThrCtrl processing.
#[derive(Clone, Copy, Default, Debug)]
pub struct StatusReport {
    /// Flag for each thruster which is raised if its pulse width was clamped
    /// into the safety band on this cycle.
    pub pw_limited: [bool; NUM_THRUSTERS],
}

/// Flat snapshot of the commanded manoeuvre and mixed pulse widths for csv
/// archiving.
#[derive(Clone, Copy, Serialize)]
struct OutputSnapshot {
    surge: f64,
    sway: f64,
    heave: f64,
    yaw: f64,
    fr_pw_us: u16,
    fl_pw_us: u16,
    br_pw_us: u16,
    bl_pw_us: u16,
    f_pw_us: u16,
    b_pw_us: u16,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ThrCtrl {
    type InitData = &'static str;
    type InitError = ThrCtrlError;

    type InputData = InputData;
    type OutputData = ThrusterDems;
    type StatusReport = StatusReport;
    type ProcError = ThrCtrlError;

    /// Initialise the ThrCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = params::load(init_data)
            .map_err(ThrCtrlError::ParamLoadError)?;

        // Validate them before anything gets mixed with them
        self.params.are_valid().map_err(ThrCtrlError::ParamsInvalid)?;

        // Build the mixing matrix
        self.matrix = Some(mixer::mixing_matrix(&self.params));

        // Create the arch folder for thr_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("thr_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archiver
        self.arch_output = Archiver::from_path(
            session, "thr_ctrl/output.csv"
        ).unwrap();

        Ok(())
    }

    /// Perform cyclic processing of Thruster Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        let matrix = match self.matrix {
            Some(m) => m,
            None => return Err(ThrCtrlError::NotInitialised),
        };

        // Check to see if there's a new command
        if let Some(cmd) = input_data.cmd {
            self.current_cmd = Some(cmd);
        }

        // If a command is in effect mix it, otherwise hold the previous
        // output. If there has never been a command all thrusters sit at
        // neutral.
        let output = match self.current_cmd {
            Some(ref cmd) => {
                let (dems, limited) = mixer::mix(&matrix, &self.params, cmd);
                self.report.pw_limited = limited;
                dems
            }
            None => self.output.unwrap_or_default(),
        };

        trace!("ThrCtrl output: {:?}", output.pulse_width_us);

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for ThrCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let cmd = self.current_cmd.unwrap_or_else(MnvrCmd::zero);
        let output = self.output.unwrap_or_default();

        self.arch_output.serialise(OutputSnapshot {
            surge: cmd.surge,
            sway: cmd.sway,
            heave: cmd.heave,
            yaw: cmd.yaw,
            fr_pw_us: output.pulse_width_us[0],
            fl_pw_us: output.pulse_width_us[1],
            br_pw_us: output.pulse_width_us[2],
            bl_pw_us: output.pulse_width_us[3],
            f_pw_us: output.pulse_width_us[4],
            b_pw_us: output.pulse_width_us[5],
        })?;

        Ok(())
    }
}

impl ThrCtrl {
    /// Force the module into its safe state, commanding neutral on every
    /// thruster on the next cycle.
    pub fn make_safe(&mut self) {
        self.current_cmd = Some(MnvrCmd::zero());
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Build a ThrCtrl without touching the filesystem.
    fn test_thr_ctrl() -> ThrCtrl {
        let params = Params {
            mixing_matrix: [
                [1.0, -1.0, 0.0, -1.0],
                [1.0, 1.0, 0.0, 1.0],
                [1.0, 1.0, 0.0, -1.0],
                [1.0, -1.0, 0.0, 1.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
            centre_pw_us: 1500.0,
            scale_pw_us: 150.0,
            min_pw_us: 1350.0,
            max_pw_us: 1650.0,
        };
        let matrix = mixer::mixing_matrix(&params);

        ThrCtrl {
            params,
            matrix: Some(matrix),
            ..ThrCtrl::default()
        }
    }

    #[test]
    fn test_no_command_is_neutral() {
        let mut thr_ctrl = test_thr_ctrl();

        let (output, _) = thr_ctrl.proc(&InputData { cmd: None }).unwrap();

        assert_eq!(output, ThrusterDems::default());
    }

    #[test]
    fn test_command_held_between_cycles() {
        let mut thr_ctrl = test_thr_ctrl();

        let cmd = MnvrCmd {
            heave: -0.5,
            ..MnvrCmd::zero()
        };

        let (first, _) = thr_ctrl
            .proc(&InputData { cmd: Some(cmd) })
            .unwrap();

        // A cycle with no new command repeats the previous demand
        let (second, _) = thr_ctrl.proc(&InputData { cmd: None }).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.pulse_width_us[4], 1425);
        assert_eq!(first.pulse_width_us[5], 1425);
    }

    #[test]
    fn test_make_safe_overrides_command() {
        let mut thr_ctrl = test_thr_ctrl();

        let cmd = MnvrCmd {
            surge: 1.0,
            ..MnvrCmd::zero()
        };
        thr_ctrl.proc(&InputData { cmd: Some(cmd) }).unwrap();

        thr_ctrl.make_safe();
        let (output, report) = thr_ctrl.proc(&InputData { cmd: None }).unwrap();

        assert_eq!(output, ThrusterDems::default());
        assert!(report.pw_limited.iter().all(|&l| !l));
    }

    #[test]
    fn test_uninitialised_proc_errors() {
        let mut thr_ctrl = ThrCtrl::default();

        assert!(thr_ctrl.proc(&InputData { cmd: None }).is_err());
    }
}
