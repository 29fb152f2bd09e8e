//! Main vehicle-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telecommand acquisition and handling
//!         - Thruster control processing
//!         - Arm control processing
//!         - Serial driver execution
//!
//! # Modules
//!
//! All modules (e.g. `thr_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use comms_if::tc::Tc;
use rov_lib::{
    data_store::{DataStore, SafeModeCause},
    tc_processor, CYCLE_FREQUENCY_HZ, CYCLE_PERIOD_S,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{error, info, warn};
use std::env;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Limit of the number of consecutive cycles with failed serial writes
/// before safe mode will be engaged.
const MAX_SERIAL_WRITE_FAILURE_LIMIT: u64 = 5;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("rov_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Triton ROV Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE TC SOURCE ----

    // TC source is used to determine whether we're getting TCs from a script
    // or from the operator's console.
    let mut tc_source;

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    // If we have a single argument use it as the script path
    if args.len() == 2 {
        info!("Loading script from \"{}\"", &args[1]);

        // Load the script interpreter
        let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

        // Display some info
        info!(
            "Loaded script lasts {:.02} s and contains {} TCs\n",
            si.get_duration(),
            si.get_num_tcs()
        );

        // Set the interpreter in the source
        tc_source = TcSource::Script(si);
    }
    // If no arguments read TCs typed at the console
    else if args.len() == 1 {
        info!("No script provided, reading TCs from the console\n");

        tc_source = TcSource::Console(spawn_console_reader());
    } else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    }

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.thr_ctrl
        .init("thr_ctrl.toml", &session)
        .wrap_err("Failed to initialise ThrCtrl")?;
    info!("ThrCtrl init complete");

    ds.arm_ctrl
        .init("arm_ctrl.toml", &session)
        .wrap_err("Failed to initialise ArmCtrl")?;
    info!("ArmCtrl init complete");

    // Failing to open the serial port is fatal, the vehicle cannot be
    // commanded without it.
    ds.serial_driver
        .init("serial_driver.toml", &session)
        .wrap_err("Failed to initialise SerialDriver")?;
    info!("SerialDriver init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- TELECOMMAND PROCESSING ----

        // Branch depending on the source
        match tc_source {
            TcSource::Script(ref mut si) => match si.get_pending_tcs() {
                PendingTcs::None => (),
                PendingTcs::Some(tc_vec) => {
                    for tc in tc_vec.iter() {
                        exec_tc(&mut ds, tc);
                    }
                }
                // Exit if end of script reached
                PendingTcs::EndOfScript => {
                    info!("End of TC script reached, stopping");
                    break;
                }
            },

            TcSource::Console(ref rx) => loop {
                match rx.try_recv() {
                    Ok(line) => {
                        if line.trim().is_empty() {
                            continue;
                        }

                        match Tc::from_words(&line) {
                            Ok(tc) => exec_tc(&mut ds, &tc),
                            Err(e) => warn!("Could not parse TC: {}", e),
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    // Console closed, treat as a shutdown request
                    Err(TryRecvError::Disconnected) => {
                        info!("Console closed, stopping");
                        ds.shutdown_requested = true;
                        break;
                    }
                }
            },
        };

        if ds.shutdown_requested {
            break;
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // ThrCtrl processing
        match ds.thr_ctrl.proc(&ds.thr_ctrl_input) {
            Ok((o, r)) => {
                ds.thr_ctrl_output = o;
                ds.thr_ctrl_status_rpt = r;
            }
            Err(e) => {
                // ThrCtrl errors usually just mean you sent the wrong TC, so just issue the
                // warning and continue.
                warn!("Error during ThrCtrl processing: {}", e)
            }
        };

        // ArmCtrl processing
        match ds.arm_ctrl.proc(&ds.arm_ctrl_input) {
            Ok((o, r)) => {
                ds.arm_ctrl_output = o;
                ds.arm_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during ArmCtrl processing: {}", e),
        };

        // ---- DRIVER EXECUTION ----

        let driver_input = rov_lib::serial_driver::InputData {
            safe_mode: ds.safe,
            thr_dems: ds.thr_ctrl_output,
            arm_dems: ds.arm_ctrl_output.clone(),
        };

        match ds.serial_driver.proc(&driver_input) {
            Ok((_, r)) => ds.serial_driver_status_rpt = r,
            Err(e) => warn!("Error during SerialDriver processing: {}", e),
        };

        // Monitor the health of the serial link. A run of cycles with failed
        // writes puts the vehicle into safe mode until the link recovers.
        if ds.serial_driver_status_rpt.num_write_failures > 0 {
            ds.num_consec_serial_write_failures += 1;

            if ds.num_consec_serial_write_failures > MAX_SERIAL_WRITE_FAILURE_LIMIT {
                if !ds.safe {
                    error!(
                        "Serial writes have failed on more than {} consecutive cycles",
                        MAX_SERIAL_WRITE_FAILURE_LIMIT
                    );
                }
                ds.make_safe(SafeModeCause::SerialLinkDegraded);
            }
        } else {
            ds.num_consec_serial_write_failures = 0;
            ds.make_unsafe(SafeModeCause::SerialLinkDegraded).ok();
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = write_archives(&mut ds) {
            warn!("Could not write archives: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    // Command neutral thrusters before releasing the port
    let neutral_input = rov_lib::serial_driver::InputData {
        safe_mode: true,
        ..Default::default()
    };
    if let Err(e) = ds.serial_driver.proc(&neutral_input) {
        warn!("Could not neutralise thrusters on shutdown: {}", e);
    }

    info!("End of execution");

    Ok(())
}

/// Execute a TC, honouring safe mode.
///
/// While the vehicle is safe only the make unsafe and shutdown TCs are
/// processed, everything else is rejected.
fn exec_tc(ds: &mut DataStore, tc: &Tc) {
    if ds.safe && !matches!(tc, Tc::MakeUnsafe | Tc::Shutdown) {
        warn!("Vehicle is in safe mode, rejecting {:?}", tc);
        return;
    }

    tc_processor::exec(ds, tc);
}

/// Write all module archives for this cycle.
fn write_archives(ds: &mut DataStore) -> Result<(), Box<dyn std::error::Error>> {
    ds.thr_ctrl.write()?;
    ds.arm_ctrl.write()?;
    ds.serial_driver.write()?;

    Ok(())
}

/// Spawn the thread reading operator TC lines from stdin.
fn spawn_console_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let stdin = std::io::stdin();

        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };

            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Various sources for the telecommands incoming to the exec.
enum TcSource {
    /// TCs read from a timestamped dive script.
    Script(ScriptInterpreter),

    /// TC lines typed by the operator at the console.
    Console(Receiver<String>),
}
