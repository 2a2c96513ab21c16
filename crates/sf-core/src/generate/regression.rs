//! Linear regression data generator.
//!
//! Draws predictor values from a Gaussian, then computes responses as an
//! affine function plus Gaussian observation noise. The result is a
//! two-variable series: variable 0 is the predictor, variable 1 the
//! response.

use crate::series::TimeSeries;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use sf_common::{Error, Result};

/// Configuration for the regression generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionConfig {
    pub slope: f64,
    pub intercept: f64,
    /// Observation noise standard deviation.
    pub noise_sd: f64,
    /// Number of (x, y) pairs.
    pub n: usize,
    /// Location of the predictor distribution.
    pub x_location: f64,
    /// Scale of the predictor distribution.
    pub x_scale: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            slope: 1.5,
            intercept: 2.0,
            noise_sd: 1.25,
            n: 100,
            x_location: 0.0,
            x_scale: 2.0,
        }
    }
}

/// Generate regression pairs from a known affine process.
pub fn simulate_regression(config: &RegressionConfig, seed: u64) -> Result<TimeSeries> {
    if !(config.noise_sd.is_finite() && config.noise_sd > 0.0) {
        return Err(Error::Spec(format!(
            "noise_sd must be positive and finite, got {}",
            config.noise_sd
        )));
    }
    if !(config.x_scale.is_finite() && config.x_scale > 0.0) {
        return Err(Error::Spec(format!(
            "x_scale must be positive and finite, got {}",
            config.x_scale
        )));
    }
    if config.n < 2 {
        return Err(Error::SeriesTooShort {
            length: config.n,
            min: 2,
        });
    }
    if !config.slope.is_finite() || !config.intercept.is_finite() {
        return Err(Error::Spec("slope and intercept must be finite".into()));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(config.n);
    for _ in 0..config.n {
        let zx: f64 = rng.sample(StandardNormal);
        let zy: f64 = rng.sample(StandardNormal);
        let x = config.x_location + config.x_scale * zx;
        let y = config.intercept + config.slope * x + config.noise_sd * zy;
        points.push(vec![x, y]);
    }
    TimeSeries::new(points)
}
