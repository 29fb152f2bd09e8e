//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use crate::data_store::{DataStore, SafeModeCause};
use comms_if::tc::{mnvr::MnvrCmd, Tc};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules.
pub fn exec(ds: &mut DataStore, tc: &Tc) {
    // Handle different Tcs
    match tc {
        Tc::Mnvr(m) => {
            ds.thr_ctrl_input.cmd = Some(*m);
        }
        Tc::Arm(a) => {
            ds.arm_ctrl_input.inputs = Some(*a);
        }
        Tc::Stop => {
            debug!("Recieved Stop command");

            // Thrusters to neutral, arm frozen where it is
            ds.thr_ctrl_input.cmd = Some(MnvrCmd::zero());
            ds.arm_ctrl.make_safe();
        }
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
        }
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            ds.make_unsafe(SafeModeCause::MakeSafeTc).ok();
        }
        Tc::Shutdown => {
            info!("Recieved Shutdown command");
            ds.shutdown_requested = true;
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
    fn test_mnvr_tc_routed_to_thr_ctrl() {
        let mut ds = DataStore::default();

        let tc = Tc::Mnvr(MnvrCmd {
            surge: 0.5,
            sway: 0.0,
            heave: 0.0,
            yaw: -0.1,
        });
        exec(&mut ds, &tc);

        let cmd = ds.thr_ctrl_input.cmd.unwrap();
        assert_eq!(cmd.surge, 0.5);
        assert_eq!(cmd.yaw, -0.1);
    }

    #[test]
    fn test_stop_tc_zeroes_motion() {
        let mut ds = DataStore::default();

        exec(&mut ds, &Tc::Stop);

        let cmd = ds.thr_ctrl_input.cmd.unwrap();
        assert_eq!(cmd.surge, 0.0);
        assert_eq!(cmd.heave, 0.0);
    }

    #[test]
    fn test_safe_and_shutdown_tcs() {
        let mut ds = DataStore::default();

        exec(&mut ds, &Tc::MakeSafe);
        assert!(ds.safe);

        exec(&mut ds, &Tc::MakeUnsafe);
        assert!(!ds.safe);

        exec(&mut ds, &Tc::Shutdown);
        assert!(ds.shutdown_requested);
    }
}
