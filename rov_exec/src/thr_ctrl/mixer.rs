//! Thruster mixing calculations
//!
//! The mixer is a pure function from a 4-DOF manoeuvre command to one pulse
//! width per thruster. It performs no I/O and holds no state: thruster
//! control wraps it in the cyclic module machinery.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix6x4, Vector4};

// Internal
use super::{Params, NUM_DOFS, NUM_THRUSTERS};
use comms_if::{eqpt::ThrusterDems, tc::mnvr::MnvrCmd};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the mixing matrix from the loaded parameters.
///
/// Rows are thrusters in `comms_if::eqpt::THRUSTER_IDS` order, columns are
/// the degrees of freedom in surge, sway, heave, yaw order.
pub fn mixing_matrix(params: &Params) -> Matrix6x4<f64> {
    let mut flat = [0f64; NUM_THRUSTERS * NUM_DOFS];

    for (i, row) in params.mixing_matrix.iter().enumerate() {
        flat[i * NUM_DOFS..(i + 1) * NUM_DOFS].copy_from_slice(row);
    }

    Matrix6x4::from_row_slice(&flat)
}

/// Mix a manoeuvre command into one pulse width demand per thruster.
///
/// For each thruster row `r` the mixer output is `dot(r, [surge, sway,
/// heave, yaw])`, converted to a pulse width by the affine transform
/// `pw = centre + output * scale` and clamped into the safety band.
///
/// The clamp is unconditional: any numeric input, including demands far
/// outside `[-1, 1]`, is accepted and saturated rather than rejected.
///
/// Also returns one flag per thruster indicating whether its pulse width
/// was limited by the safety band.
pub fn mix(
    matrix: &Matrix6x4<f64>,
    params: &Params,
    cmd: &MnvrCmd,
) -> (ThrusterDems, [bool; NUM_THRUSTERS]) {
    let intent = Vector4::new(cmd.surge, cmd.sway, cmd.heave, cmd.yaw);

    let outputs = matrix * intent;

    let mut pulse_width_us = [0u16; NUM_THRUSTERS];
    let mut limited = [false; NUM_THRUSTERS];

    for i in 0..NUM_THRUSTERS {
        let raw_us = params.centre_pw_us + outputs[i] * params.scale_pw_us;
        let clamped_us = clamp(&raw_us, &params.min_pw_us, &params.max_pw_us);

        limited[i] = clamped_us != raw_us;
        pulse_width_us[i] = clamped_us.round() as u16;
    }

    (ThrusterDems { pulse_width_us }, limited)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Baseline vehicle parameters used by the tests.
    fn test_params() -> Params {
        Params {
            mixing_matrix: [
                [1.0, -1.0, 0.0, -1.0], // FR
                [1.0, 1.0, 0.0, 1.0],   // FL
                [1.0, 1.0, 0.0, -1.0],  // BR
                [1.0, -1.0, 0.0, 1.0],  // BL
                [0.0, 0.0, 1.0, 0.0],   // F
                [0.0, 0.0, 1.0, 0.0],   // B
            ],
            centre_pw_us: 1500.0,
            scale_pw_us: 150.0,
            min_pw_us: 1350.0,
            max_pw_us: 1650.0,
        }
    }

    #[test]
    fn test_zero_intent_gives_centre() {
        let params = test_params();
        let matrix = mixing_matrix(&params);

        let (dems, limited) = mix(&matrix, &params, &MnvrCmd::zero());

        assert!(dems.pulse_width_us.iter().all(|&pw| pw == 1500));
        assert!(limited.iter().all(|&l| !l));
    }

    #[test]
    fn test_full_surge() {
        let params = test_params();
        let matrix = mixing_matrix(&params);

        let cmd = MnvrCmd {
            surge: 1.0,
            ..MnvrCmd::zero()
        };

        let (dems, _) = mix(&matrix, &params, &cmd);

        // All four horizontal thrusters drive forwards, verticals stay put
        assert_eq!(dems.pulse_width_us, [1650, 1650, 1650, 1650, 1500, 1500]);
    }

    #[test]
    fn test_safety_band_always_enforced() {
        let params = test_params();
        let matrix = mixing_matrix(&params);

        // Wildly out of range intents must still saturate into the band
        let cmd = MnvrCmd {
            surge: 100.0,
            sway: -250.0,
            heave: 1e6,
            yaw: -3.5,
        };

        let (dems, limited) = mix(&matrix, &params, &cmd);

        for pw in dems.pulse_width_us.iter() {
            assert!(*pw >= 1350 && *pw <= 1650);
        }
        assert!(limited.iter().any(|&l| l));
    }

    #[test]
    fn test_yaw_pair_symmetry() {
        let params = test_params();
        let matrix = mixing_matrix(&params);

        // FR and FL rows are negations of each other on the yaw column, so a
        // yaw-only intent must deviate them from centre by equal magnitude
        // and opposite sign.
        let cmd = MnvrCmd {
            yaw: 0.3,
            ..MnvrCmd::zero()
        };

        let (dems, _) = mix(&matrix, &params, &cmd);

        let fr_dev = dems.pulse_width_us[0] as i32 - 1500;
        let fl_dev = dems.pulse_width_us[1] as i32 - 1500;

        assert_eq!(fr_dev, -fl_dev);
        assert_ne!(fr_dev, 0);
    }
}
