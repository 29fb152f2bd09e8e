//! # Thruster Mixer Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use comms_if::tc::mnvr::MnvrCmd;
use rov_lib::thr_ctrl::{mix, mixing_matrix, Params};

fn mixer_benchmark(c: &mut Criterion) {
    // ---- Build the default vehicle params ----

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

    let matrix = mixing_matrix(&params);

    let cmd = MnvrCmd {
        surge: 0.7,
        sway: -0.3,
        heave: 0.5,
        yaw: -0.1,
    };

    c.bench_function("mixer::mix", |b| {
        b.iter(|| mix(black_box(&matrix), black_box(&params), black_box(&cmd)))
    });
}

criterion_group!(benches, mixer_benchmark);
criterion_main!(benches);
