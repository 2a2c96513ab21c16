//! Logistic-growth ODE data generator.
//!
//! Integrates `dx/dt = r x (1 - x/K)` (optionally with an additive
//! sinusoidal forcing term) over a time grid with the shared RK4
//! integrator, then samples the trajectory at the grid points and adds
//! Gaussian observation noise.

use crate::ode::{integrate, OdeFailure, OdeTolerances};
use crate::series::TimeSeries;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use sf_common::{Error, Result};
use std::f64::consts::TAU;

/// Additive sinusoidal forcing term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forcing {
    pub amplitude: f64,
    pub period: f64,
}

/// Configuration for the logistic-growth generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticConfig {
    pub growth_rate: f64,
    pub capacity: f64,
    pub initial: f64,
    #[serde(default)]
    pub forcing: Option<Forcing>,
    /// Observation noise standard deviation.
    pub noise_sd: f64,
    /// Observation times, strictly increasing.
    pub times: Vec<f64>,
    #[serde(default)]
    pub tolerances: OdeTolerances,
}

/// Right-hand side of the (optionally forced) logistic equation.
pub fn logistic_rhs(
    growth_rate: f64,
    capacity: f64,
    forcing: Option<Forcing>,
) -> impl Fn(f64, f64) -> f64 {
    move |t, x| {
        let base = growth_rate * x * (1.0 - x / capacity);
        match forcing {
            Some(f) => base + f.amplitude * (TAU * t / f.period).sin(),
            None => base,
        }
    }
}

/// Validate that a time grid is usable as an observation grid.
pub fn validate_times(times: &[f64]) -> Result<()> {
    if times.len() < 2 {
        return Err(Error::SeriesTooShort {
            length: times.len(),
            min: 2,
        });
    }
    if times.iter().any(|t| !t.is_finite()) {
        return Err(Error::Spec("observation times must be finite".into()));
    }
    if times.windows(2).any(|w| w[1] <= w[0]) {
        return Err(Error::Spec("observation times must be strictly increasing".into()));
    }
    Ok(())
}

/// Generate a noisy univariate series from the logistic process.
pub fn simulate_logistic(config: &LogisticConfig, seed: u64) -> Result<TimeSeries> {
    if !(config.capacity.is_finite() && config.capacity > 0.0) {
        return Err(Error::Spec(format!(
            "capacity must be positive and finite, got {}",
            config.capacity
        )));
    }
    if !(config.initial.is_finite() && config.initial > 0.0) {
        return Err(Error::Spec(format!(
            "initial state must be positive and finite, got {}",
            config.initial
        )));
    }
    if !config.growth_rate.is_finite() {
        return Err(Error::Spec("growth rate must be finite".into()));
    }
    if !(config.noise_sd.is_finite() && config.noise_sd > 0.0) {
        return Err(Error::Spec(format!(
            "noise_sd must be positive and finite, got {}",
            config.noise_sd
        )));
    }
    if let Some(f) = config.forcing {
        if !(f.period.is_finite() && f.period > 0.0) || !f.amplitude.is_finite() {
            return Err(Error::Spec("forcing amplitude/period must be finite, period positive".into()));
        }
    }
    validate_times(&config.times)?;

    let rhs = logistic_rhs(config.growth_rate, config.capacity, config.forcing);
    let trajectory = integrate(rhs, config.initial, &config.times, &config.tolerances)
        .map_err(|failure| match failure {
            OdeFailure::StepBudget { max_steps } => Error::OdeStepBudget { max_steps },
            OdeFailure::NonFinite => Error::NumericalInstability(
                "ODE trajectory left the finite range".into(),
            ),
        })?;

    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<f64> = trajectory
        .iter()
        .map(|x| x + config.noise_sd * rng.sample::<f64, _>(StandardNormal))
        .collect();

    TimeSeries::univariate(values)
}
