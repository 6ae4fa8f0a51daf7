//! # Kinematics Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arm_lib::{
    joint::JointVector,
    kinematics::Solver,
    traj_gen::{self, ShakeParams},
};
use nalgebra::Vector3;

fn kinematics_benchmark(c: &mut Criterion) {
    let solver = Solver::reference();
    let home = [90, 60, 110];

    c.bench_function("forward", |b| b.iter(|| solver.forward(black_box(home))));

    // A short move from the default pose, as done by an inverse command
    let near = solver.forward(home) + Vector3::new(2.5, 0.0, 1.0);
    c.bench_function("inverse near", |b| {
        b.iter(|| solver.inverse(black_box(&near), home))
    });

    // A long move across the workspace
    let far = solver.forward([30, 100, 150]);
    c.bench_function("inverse far", |b| {
        b.iter(|| solver.inverse(black_box(&far), home))
    });

    let start = JointVector::new([90, 60, 110, 90, 90, 90]);
    let params = ShakeParams {
        radius_cm: 2.5,
        clockwise: true,
        hold: 1,
        repeats: 5,
    };
    c.bench_function("shake", |b| {
        b.iter(|| traj_gen::shake(&solver, black_box(&start), &params))
    });
}

criterion_group!(benches, kinematics_benchmark);
criterion_main!(benches);
