//! Summarization and diagnostics benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use sf_core::summary::{ess, split_rhat, ChainDraws, FitReport, PosteriorSampleSet, SummaryOptions};

fn gaussian_chains(m: usize, n: usize) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..m)
        .map(|_| (0..n).map(|_| rng.sample::<f64, _>(StandardNormal)).collect())
        .collect()
}

fn bench_diagnostics(c: &mut Criterion) {
    let chains = gaussian_chains(4, 1000);
    c.bench_function("split_rhat_4x1000", |b| {
        b.iter(|| split_rhat(black_box(&chains)))
    });
    c.bench_function("ess_4x1000", |b| b.iter(|| ess(black_box(&chains))));
}

fn bench_report(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let parameters: Vec<String> = (0..12).map(|i| format!("theta[{i}]")).collect();
    let chains: Vec<ChainDraws> = (0..4)
        .map(|_| ChainDraws {
            draws: (0..1000)
                .map(|_| {
                    (0..12)
                        .map(|_| rng.sample::<f64, _>(StandardNormal))
                        .collect()
                })
                .collect(),
        })
        .collect();
    let set = PosteriorSampleSet::new(parameters, chains).unwrap();

    c.bench_function("fit_report_12x4x1000", |b| {
        b.iter(|| FitReport::build("bench", black_box(&set), &SummaryOptions::default()).unwrap())
    });
}

criterion_group!(benches, bench_diagnostics, bench_report);
criterion_main!(benches);
