//! Sampling engines.
//!
//! The pipeline treats the Bayesian sampler as an opaque capability: any
//! type implementing [`SamplingEngine`] can consume the adapter's output
//! and return chain-grouped draws. Two implementations ship here:
//!
//! - [`MetropolisEngine`]: adaptive random-walk Metropolis, the default
//! - `MockEngine` (behind `test-utils`): deterministic draws around
//!   known true values, for statistical round-trip tests
//!
//! Engines may parallelize across chains internally; from the caller's
//! perspective `fit` is synchronous. [`fit_with_timeout`] bounds an
//! invocation with a wall-clock budget.

pub mod logp;
pub mod metropolis;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use logp::Posterior;
pub use metropolis::MetropolisEngine;

use crate::adapt::EngineInput;
use crate::ode::OdeTolerances;
use crate::summary::PosteriorSampleSet;
use serde::{Deserialize, Serialize};
use sf_common::{Error, Result};
use std::sync::mpsc;
use std::time::Duration;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Number of independent chains.
    pub chains: usize,
    /// Retained draws per chain, after warm-up.
    pub iterations: usize,
    /// Warm-up iterations discarded per chain.
    pub warmup: usize,
    /// Base seed; each chain derives its own stream from it.
    pub seed: u64,
    /// Tolerances for any embedded ODE integration.
    #[serde(default)]
    pub ode: OdeTolerances,
    /// Wall-clock budget for one `fit` invocation, in seconds.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            chains: 4,
            iterations: 1000,
            warmup: 1000,
            seed: 0,
            ode: OdeTolerances::default(),
            timeout_seconds: None,
        }
    }
}

impl SamplerConfig {
    /// Fail fast on configurations no engine can honor.
    pub fn validate(&self) -> Result<()> {
        if self.chains == 0 {
            return Err(Error::Spec("sampler needs at least one chain".into()));
        }
        if self.iterations < 4 {
            return Err(Error::Spec(
                "sampler needs at least 4 retained iterations per chain".into(),
            ));
        }
        Ok(())
    }
}

/// An opaque Bayesian sampling capability.
pub trait SamplingEngine {
    /// Run the sampler, returning draws grouped by chain.
    fn fit(&self, input: &EngineInput, config: &SamplerConfig) -> Result<PosteriorSampleSet>;
}

/// Run an engine with a wall-clock budget.
///
/// When `config.timeout_seconds` is unset this is a plain `fit` call.
/// Otherwise the engine runs on a worker thread and a timeout surfaces
/// as [`Error::SamplerTimeout`] instead of blocking indefinitely. The
/// worker is detached on timeout; its result is discarded.
pub fn fit_with_timeout<E>(
    engine: E,
    input: EngineInput,
    config: SamplerConfig,
) -> Result<PosteriorSampleSet>
where
    E: SamplingEngine + Send + 'static,
{
    let Some(seconds) = config.timeout_seconds else {
        return engine.fit(&input, &config);
    };

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let result = engine.fit(&input, &config);
        // The receiver may be gone after a timeout; that is fine.
        let _ = tx.send(result);
    });

    match rx.recv_timeout(Duration::from_secs(seconds)) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(Error::SamplerTimeout { seconds }),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(Error::Sampler("engine worker terminated without a result".into()))
        }
    }
}
