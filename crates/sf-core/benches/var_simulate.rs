//! Generator throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sf_core::generate::{simulate_var, stable_phi, NoiseSpec};

fn bench_stable_phi(c: &mut Criterion) {
    c.bench_function("stable_phi_3x3", |b| {
        b.iter(|| stable_phi(black_box(3), black_box(0.8), black_box(42)).unwrap())
    });
}

fn bench_simulate_var(c: &mut Criterion) {
    let phi = stable_phi(3, 0.8, 42).unwrap();
    let diagonal = NoiseSpec::Diagonal(vec![1.0, 1.0, 1.0]);
    c.bench_function("simulate_var_3x1000_diagonal", |b| {
        b.iter(|| simulate_var(black_box(&phi), &diagonal, black_box(1000), 7).unwrap())
    });

    let cov = nalgebra::DMatrix::from_row_slice(
        3,
        3,
        &[1.0, 0.3, 0.1, 0.3, 1.0, 0.2, 0.1, 0.2, 1.0],
    );
    let correlated = NoiseSpec::Covariance(cov);
    c.bench_function("simulate_var_3x1000_correlated", |b| {
        b.iter(|| simulate_var(black_box(&phi), &correlated, black_box(1000), 7).unwrap())
    });
}

criterion_group!(benches, bench_stable_phi, bench_simulate_var);
criterion_main!(benches);
