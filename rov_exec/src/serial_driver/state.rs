//! Implementations for the SerialDriver state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::io::Write;
use std::time::{Duration, Instant};

// Internal
use super::{CmdGate, Params, SerialDriverError};
use comms_if::eqpt::{ActCmd, ArmDems, ThrusterDems, ARM_IDS, NUM_THRUSTERS, THRUSTER_IDS};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A line-oriented byte sink the driver writes commands to.
///
/// The vehicle's serial port is the real sink. Test doubles implement this
/// to capture or fail writes.
pub trait LineSink {
    fn write_line(&mut self, line: &str) -> Result<(), std::io::Error>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Serial driver module state
#[derive(Default)]
pub struct SerialDriver {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) gate: CmdGate,

    sink: Option<Box<dyn LineSink>>,
}

/// Input data to the Serial driver.
#[derive(Default)]
pub struct InputData {
    /// When true all thrusters are commanded to neutral regardless of the
    /// demands passed in.
    pub safe_mode: bool,

    pub thr_dems: ThrusterDems,

    pub arm_dems: ArmDems,
}

/// Status report for SerialDriver processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Number of commands written to the sink on this cycle.
    pub num_emitted: u32,

    /// Number of candidate commands the gate suppressed on this cycle.
    pub num_suppressed: u32,

    /// Number of commands dropped because the write failed on this cycle.
    pub num_write_failures: u32,
}

/// A real serial port as a line sink.
struct PortSink {
    port: Box<dyn serialport::SerialPort>,
}

/// Logging-only sink used when `send_serial` is off.
struct LogSink;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineSink for PortSink {
    fn write_line(&mut self, line: &str) -> Result<(), std::io::Error> {
        self.port.write_all(line.as_bytes())?;
        self.port.flush()
    }
}

impl LineSink for LogSink {
    fn write_line(&mut self, line: &str) -> Result<(), std::io::Error> {
        debug!("Serial out: {:?}", line);
        Ok(())
    }
}

impl State for SerialDriver {
    type InitData = &'static str;
    type InitError = SerialDriverError;

    type InputData = InputData;
    type OutputData = ();
    type StatusReport = StatusReport;
    type ProcError = SerialDriverError;

    /// Initialise the Serial driver.
    ///
    /// Expected init data is the path to the parameter file. Failure to open
    /// the port is fatal, the vehicle cannot run without its command link.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = params::load(init_data)
            .map_err(SerialDriverError::ParamLoadError)?;

        // Validate them before opening the port
        self.params
            .are_valid()
            .map_err(SerialDriverError::ParamsInvalid)?;

        // Build the command gate
        self.gate = CmdGate::new(
            self.params.value_gating,
            self.params.time_gating,
            Duration::from_millis(self.params.command_delay_ms),
        );

        // Open the port, unless serial sending is switched off in which case
        // commands go to the log instead. The timeout bounds how long a
        // single write may block the control loop.
        self.sink = match self.params.send_serial {
            true => {
                let port =
                    serialport::new(self.params.port_name.clone(), self.params.baud_rate)
                        .timeout(Duration::from_millis(100))
                        .open()
                        .map_err(SerialDriverError::PortOpenFailed)?;

                Some(Box::new(PortSink { port }))
            }
            false => {
                info!("send_serial is off, commands will be logged, not sent");

                Some(Box::new(LogSink))
            }
        };

        // Create the arch folder for serial_driver
        let mut arch_path = session.arch_root.clone();
        arch_path.push("serial_driver");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(
            session, "serial_driver/status_report.csv"
        ).unwrap();

        Ok(())
    }

    /// Cyclic processing for the Serial driver.
    ///
    /// Takes the demands from ThrCtrl and ArmCtrl and writes the commands
    /// which pass the gate to the port.
    ///
    /// # Notes
    /// - A failed write is not an error: the command is logged and dropped,
    ///   and since the gate is not updated the next cycle will re-send it.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        let sink = match self.sink {
            Some(ref mut s) => s,
            None => return Err(SerialDriverError::NotInitialised),
        };

        // In safe mode the thrusters are forced to neutral. The arm demands
        // pass through unchanged, arm control freezes them itself.
        let thr_dems = match input_data.safe_mode {
            true => ThrusterDems::default(),
            false => input_data.thr_dems,
        };

        // Collect the candidate commands, thrusters first then arm axes
        let mut cmds: Vec<ActCmd> = Vec::with_capacity(NUM_THRUSTERS + ARM_IDS.len());

        for (i, act_id) in THRUSTER_IDS.iter().enumerate() {
            cmds.push(ActCmd {
                act_id: *act_id,
                value: thr_dems.pulse_width_us[i] as f64,
            });
        }
        for act_id in ARM_IDS.iter() {
            if let Some(pos_deg) = input_data.arm_dems.pos_deg.get(act_id) {
                cmds.push(ActCmd {
                    act_id: *act_id,
                    value: *pos_deg,
                });
            }
        }

        // Gate and write each command
        for cmd in cmds {
            let wire_value = cmd.value.round() as i64;
            let now = Instant::now();

            if !self.gate.permits(cmd.act_id, wire_value, now) {
                self.report.num_suppressed += 1;
                continue;
            }

            let line = cmd.to_line();

            match sink.write_line(&line) {
                Ok(()) => {
                    self.gate.record(cmd.act_id, wire_value, now);
                    self.report.num_emitted += 1;

                    trace!("Sent {:?}", line);

                    // Pace the downstream microcontroller
                    if self.params.serial_delay_ms > 0 {
                        std::thread::sleep(Duration::from_millis(
                            self.params.serial_delay_ms,
                        ));
                    }
                }
                Err(e) => {
                    warn!("Failed to write {:?} command, dropping it: {}", cmd.act_id, e);
                    self.report.num_write_failures += 1;
                }
            }
        }

        Ok(((), self.report))
    }
}

impl Archived for SerialDriver {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;

        Ok(())
    }
}

impl SerialDriver {
    /// Build a driver around an already constructed sink.
    ///
    /// Used by the test doubles, the real executable goes through `init`.
    pub fn with_sink(params: Params, sink: Box<dyn LineSink>) -> Self {
        let gate = CmdGate::new(
            params.value_gating,
            params.time_gating,
            Duration::from_millis(params.command_delay_ms),
        );

        SerialDriver {
            params,
            gate,
            sink: Some(sink),
            ..SerialDriver::default()
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::arm_ctrl::{self, ArmCtrl, ResponsePolicy};
    use comms_if::tc::arm::ArmInputs;
    use std::sync::{Arc, Mutex};
    use util::module::State;

    /// Sink which captures every line written to it.
    #[derive(Default, Clone)]
    struct MockSink {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl LineSink for MockSink {
        fn write_line(&mut self, line: &str) -> Result<(), std::io::Error> {
            self.lines.lock().unwrap().push(line.to_string());
            Ok(())
        }
    }

    /// Sink whose writes always fail.
    struct BrokenSink;

    impl LineSink for BrokenSink {
        fn write_line(&mut self, _line: &str) -> Result<(), std::io::Error> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }
    }

    /// Driver params with value gating only and no pacing delay.
    fn test_params() -> Params {
        Params {
            send_serial: false,
            port_name: "/dev/null".to_string(),
            baud_rate: 115200,
            value_gating: true,
            time_gating: false,
            command_delay_ms: 0,
            serial_delay_ms: 0,
        }
    }

    /// Driver params with both gating rules on, as flown.
    fn test_params_with_time_gating() -> Params {
        Params {
            time_gating: true,
            command_delay_ms: 100,
            ..test_params()
        }
    }

    fn test_arm_ctrl() -> ArmCtrl {
        ArmCtrl::with_params(arm_ctrl::Params {
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

    fn lines_with_prefix(sink: &MockSink, prefix: &str) -> Vec<String> {
        sink.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.starts_with(prefix))
            .cloned()
            .collect()
    }

    #[test]
    fn test_first_cycle_emits_everything() {
        let sink = MockSink::default();
        let mut driver = SerialDriver::with_sink(test_params(), Box::new(sink.clone()));

        let (_, report) = driver.proc(&InputData::default()).unwrap();

        // Six thrusters, no arm demands passed in
        assert_eq!(report.num_emitted, 6);
        assert_eq!(sink.lines.lock().unwrap()[0], "FR:1500\n");
    }

    #[test]
    fn test_unchanged_demands_suppressed() {
        let sink = MockSink::default();
        let mut driver = SerialDriver::with_sink(test_params(), Box::new(sink.clone()));

        driver.proc(&InputData::default()).unwrap();
        let (_, report) = driver.proc(&InputData::default()).unwrap();

        assert_eq!(report.num_emitted, 0);
        assert_eq!(report.num_suppressed, 6);
        assert_eq!(sink.lines.lock().unwrap().len(), 6);
    }

    #[test]
    fn test_safe_mode_forces_neutral_thrusters() {
        let sink = MockSink::default();
        let mut driver = SerialDriver::with_sink(test_params(), Box::new(sink.clone()));

        let input = InputData {
            safe_mode: true,
            thr_dems: ThrusterDems {
                pulse_width_us: [1650; NUM_THRUSTERS],
            },
            ..InputData::default()
        };

        driver.proc(&input).unwrap();

        for line in sink.lines.lock().unwrap().iter() {
            assert!(line.ends_with(":1500\n"));
        }
    }

    #[test]
    fn test_one_intent_lands_on_all_thrusters_at_once() {
        let sink = MockSink::default();
        let mut driver =
            SerialDriver::with_sink(test_params_with_time_gating(), Box::new(sink.clone()));

        // A pure-surge demand drives all four horizontal thrusters. The time
        // gate must not spread the set over several delay windows, that
        // would put transient yaw/sway moments on the vehicle.
        let input = InputData {
            thr_dems: ThrusterDems {
                pulse_width_us: [1650, 1650, 1650, 1650, 1500, 1500],
            },
            ..InputData::default()
        };

        let (_, report) = driver.proc(&input).unwrap();

        assert_eq!(report.num_emitted, 6);
        assert_eq!(report.num_suppressed, 0);

        let lines = sink.lines.lock().unwrap();
        for expected in ["FR:1650\n", "FL:1650\n", "BR:1650\n", "BL:1650\n"] {
            assert!(lines.iter().any(|l| l == expected));
        }
    }

    #[test]
    fn test_final_safe_cycle_neutralises_despite_recent_emission() {
        let sink = MockSink::default();
        let mut driver =
            SerialDriver::with_sink(test_params_with_time_gating(), Box::new(sink.clone()));

        // Drive the thrusters hard...
        let input = InputData {
            thr_dems: ThrusterDems {
                pulse_width_us: [1650; NUM_THRUSTERS],
            },
            ..InputData::default()
        };
        driver.proc(&input).unwrap();

        // ...then immediately run the shutdown safing cycle. The neutral
        // commands must not be lost to the delay window opened above, the
        // port is about to be dropped with no further chance to re-send.
        let (_, report) = driver
            .proc(&InputData {
                safe_mode: true,
                ..InputData::default()
            })
            .unwrap();

        assert_eq!(report.num_emitted, 6);
        assert_eq!(report.num_suppressed, 0);

        let lines = sink.lines.lock().unwrap();
        for expected in [
            "FR:1500\n",
            "FL:1500\n",
            "BR:1500\n",
            "BL:1500\n",
            "F:1500\n",
            "B:1500\n",
        ] {
            assert!(lines.iter().any(|l| l == expected));
        }
    }

    #[test]
    fn test_write_failure_is_not_fatal_and_resends() {
        let mut driver = SerialDriver::with_sink(test_params(), Box::new(BrokenSink));

        let (_, report) = driver.proc(&InputData::default()).unwrap();
        assert_eq!(report.num_write_failures, 6);
        assert_eq!(report.num_emitted, 0);

        // The gate was not updated so the next cycle tries again
        let (_, report) = driver.proc(&InputData::default()).unwrap();
        assert_eq!(report.num_write_failures, 6);
        assert_eq!(report.num_suppressed, 0);
    }

    #[test]
    fn test_held_trigger_emits_claw_command_once() {
        let sink = MockSink::default();
        let mut driver = SerialDriver::with_sink(test_params(), Box::new(sink.clone()));
        let mut arm = test_arm_ctrl();

        let inputs = ArmInputs {
            open_trigger: 1.0,
            ..ArmInputs::default()
        };

        // Hold the trigger above threshold for 10 consecutive cycles
        for cycle in 0..10 {
            let new_inputs = match cycle {
                0 => Some(inputs),
                _ => None,
            };

            let (arm_dems, _) = arm
                .proc(&arm_ctrl::InputData { inputs: new_inputs })
                .unwrap();

            driver
                .proc(&InputData {
                    arm_dems,
                    ..InputData::default()
                })
                .unwrap();
        }

        assert_eq!(lines_with_prefix(&sink, "claw:"), vec!["claw:180\n"]);
    }

    #[test]
    fn test_held_bumper_emits_distinct_roll_commands() {
        let sink = MockSink::default();
        let mut driver = SerialDriver::with_sink(test_params(), Box::new(sink.clone()));
        let mut arm = test_arm_ctrl();

        let inputs = ArmInputs {
            roll_pos: true,
            ..ArmInputs::default()
        };

        for cycle in 0..20 {
            let new_inputs = match cycle {
                0 => Some(inputs),
                _ => None,
            };

            let (arm_dems, _) = arm
                .proc(&arm_ctrl::InputData { inputs: new_inputs })
                .unwrap();

            driver
                .proc(&InputData {
                    arm_dems,
                    ..InputData::default()
                })
                .unwrap();
        }

        // 20 ticks at 1 deg/tick from 90, each a new value, each emitted
        assert!((arm.roll.current_deg - 110.0).abs() < 1e-9);

        let roll_lines = lines_with_prefix(&sink, "roll:");
        assert_eq!(roll_lines.len(), 20);
        assert_eq!(roll_lines[0], "roll:91\n");
        assert_eq!(roll_lines[19], "roll:110\n");
    }
}
