//! # Data Store

use comms_if::eqpt::{ArmDems, ThrusterDems};
use log::{info, warn};

use crate::{arm_ctrl, serial_driver, thr_ctrl};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the vehicle has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    SerialLinkDegraded,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub session_time_s: f64,

    /// True once an orderly shutdown has been requested
    pub shutdown_requested: bool,

    // Safe mode variables
    /// Determines if the vehicle is in safe mode.
    pub safe: bool,

    /// Gives the reason for the vehicle being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // ThrCtrl
    pub thr_ctrl: thr_ctrl::ThrCtrl,
    pub thr_ctrl_input: thr_ctrl::InputData,
    pub thr_ctrl_output: ThrusterDems,
    pub thr_ctrl_status_rpt: thr_ctrl::StatusReport,

    // ArmCtrl
    pub arm_ctrl: arm_ctrl::ArmCtrl,
    pub arm_ctrl_input: arm_ctrl::InputData,
    pub arm_ctrl_output: ArmDems,
    pub arm_ctrl_status_rpt: arm_ctrl::StatusReport,

    // SerialDriver
    pub serial_driver: serial_driver::SerialDriver,
    pub serial_driver_status_rpt: serial_driver::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive cycles on which at least one serial write failed
    pub num_consec_serial_write_failures: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the vehicle into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            // Make the control modules safe
            self.thr_ctrl.make_safe();
            self.arm_ctrl.make_safe();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        if self.num_cycles % (cycle_frequency_hz as u128) == 0 {
            self.is_1_hz_cycle = true;
        } else {
            self.is_1_hz_cycle = false;
        }

        self.thr_ctrl_input = thr_ctrl::InputData::default();
        self.thr_ctrl_output = ThrusterDems::default();
        self.thr_ctrl_status_rpt = thr_ctrl::StatusReport::default();

        self.arm_ctrl_input = arm_ctrl::InputData::default();
        self.arm_ctrl_output = ArmDems::default();
        self.arm_ctrl_status_rpt = arm_ctrl::StatusReport::default();

        self.serial_driver_status_rpt = serial_driver::StatusReport::default();

        self.session_time_s = util::session::get_elapsed_seconds();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_make_unsafe_requires_matching_cause() {
        let mut ds = DataStore::default();

        ds.make_safe(SafeModeCause::SerialLinkDegraded);
        assert!(ds.safe);

        // The operator cannot clear a safe mode they didn't cause
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_err());
        assert!(ds.safe);

        assert!(ds.make_unsafe(SafeModeCause::SerialLinkDegraded).is_ok());
        assert!(!ds.safe);
    }

    #[test]
    fn test_make_unsafe_when_not_safe_is_ok() {
        let mut ds = DataStore::default();

        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_ok());
    }
}
