//! Adaptive random-walk Metropolis engine.
//!
//! Per-coordinate random-walk updates in unconstrained space, with
//! proposal scales adapted toward a target acceptance rate during
//! warm-up and frozen afterwards. Chains are independent: each derives
//! its own RNG stream from the base seed and runs on its own scoped
//! thread; results are deterministic for a given configuration.

use crate::adapt::EngineInput;
use crate::engine::logp::Posterior;
use crate::engine::{SamplerConfig, SamplingEngine};
use crate::summary::{ChainDraws, PosteriorSampleSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use sf_common::{Error, Result};

/// Target acceptance rate for one-coordinate-at-a-time proposals.
const TARGET_ACCEPT: f64 = 0.44;

/// Warm-up iterations per scale-adaptation window.
const ADAPT_WINDOW: usize = 25;

/// Attempts to find a finite-density starting point.
const MAX_INIT_TRIES: usize = 100;

/// The built-in sampling engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetropolisEngine;

impl SamplingEngine for MetropolisEngine {
    fn fit(&self, input: &EngineInput, config: &SamplerConfig) -> Result<PosteriorSampleSet> {
        config.validate()?;
        let posterior = Posterior::new(input, config.ode)?;
        tracing::debug!(
            model = input.spec.name(),
            chains = config.chains,
            iterations = config.iterations,
            warmup = config.warmup,
            parameters = posterior.dim(),
            "starting metropolis run"
        );

        let chains: Vec<Result<ChainDraws>> = std::thread::scope(|scope| {
            let posterior = &posterior;
            let handles: Vec<_> = (0..config.chains)
                .map(|chain| scope.spawn(move || run_chain(posterior, config, chain)))
                .collect();
            handles
                .into_iter()
                .enumerate()
                .map(|(chain, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(Error::ChainFailed {
                            chain,
                            diagnostic: "worker thread panicked".into(),
                        })
                    })
                })
                .collect()
        });

        let mut out = Vec::with_capacity(chains.len());
        for chain in chains {
            out.push(chain?);
        }

        PosteriorSampleSet::new(
            posterior.decls().iter().map(|d| d.name.clone()).collect(),
            out,
        )
    }
}

/// Derive a well-mixed per-chain seed from the base seed.
fn chain_seed(base: u64, chain: usize) -> u64 {
    // splitmix64 finalizer over the chain index.
    let mut z = base.wrapping_add((chain as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn run_chain(posterior: &Posterior, config: &SamplerConfig, chain: usize) -> Result<ChainDraws> {
    let dim = posterior.dim();
    let mut rng = StdRng::seed_from_u64(chain_seed(config.seed, chain));

    // Initialize at the prior centers, jittered until the density is
    // finite. Chains start from different jitters by construction.
    let center: Vec<f64> = posterior
        .decls()
        .iter()
        .map(|d| d.support.to_unconstrained(d.prior.central()))
        .collect();

    let mut z = Vec::new();
    let mut logp = f64::NEG_INFINITY;
    for _ in 0..MAX_INIT_TRIES {
        let candidate: Vec<f64> = center
            .iter()
            .map(|c| c + 0.5 * rng.sample::<f64, _>(StandardNormal))
            .collect();
        let lp = posterior.log_density(&candidate);
        if lp.is_finite() {
            z = candidate;
            logp = lp;
            break;
        }
    }
    if !logp.is_finite() {
        return Err(Error::ChainFailed {
            chain,
            diagnostic: format!(
                "no finite log density found near the prior centers after {MAX_INIT_TRIES} tries"
            ),
        });
    }

    // Proposal scales, seeded from the priors where that is meaningful.
    let mut scales: Vec<f64> = posterior
        .decls()
        .iter()
        .map(|d| match d.support {
            sf_math::Support::Real => (0.5 * d.prior.scale()).max(1e-3),
            _ => 0.5,
        })
        .collect();

    let mut accepted = vec![0usize; dim];
    let mut proposed = vec![0usize; dim];
    let mut draws = Vec::with_capacity(config.iterations);
    let mut buf = z.clone();

    for iter in 0..(config.warmup + config.iterations) {
        let warming = iter < config.warmup;

        for j in 0..dim {
            buf.copy_from_slice(&z);
            buf[j] = z[j] + scales[j] * rng.sample::<f64, _>(StandardNormal);
            let lp = posterior.log_density(&buf);
            let delta = lp - logp;
            proposed[j] += 1;
            if delta >= 0.0 || rng.random::<f64>() < delta.exp() {
                z[j] = buf[j];
                logp = lp;
                accepted[j] += 1;
            }
        }

        if warming && (iter + 1) % ADAPT_WINDOW == 0 {
            for j in 0..dim {
                let rate = accepted[j] as f64 / proposed[j] as f64;
                scales[j] *= if rate > TARGET_ACCEPT { 1.2 } else { 0.8 };
                accepted[j] = 0;
                proposed[j] = 0;
            }
        }

        if !warming {
            draws.push(posterior.constrain(&z));
        }
    }

    let total_rate = if config.iterations > 0 && dim > 0 {
        let acc: usize = accepted.iter().sum();
        let prop: usize = proposed.iter().sum();
        if prop > 0 {
            acc as f64 / prop as f64
        } else {
            0.0
        }
    } else {
        0.0
    };
    tracing::debug!(chain, acceptance = total_rate, "chain finished");

    Ok(ChainDraws { draws })
}
