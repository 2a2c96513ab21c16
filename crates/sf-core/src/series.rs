//! Validated time-series container.
//!
//! A `TimeSeries` is an ordered sequence of observations with a fixed
//! number of variables per step. Invariants are enforced at construction
//! and hold for the series' lifetime:
//! - length >= 2 (the likelihoods all need at least one transition)
//! - dimension >= 1, identical at every step
//! - every value finite

use serde::{Deserialize, Serialize};
use sf_common::{Error, Result};

/// Minimum number of observations in a valid series.
pub const MIN_SERIES_LEN: usize = 2;

/// An ordered multivariate time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    dim: usize,
    /// points[t] is the observation vector at step t.
    points: Vec<Vec<f64>>,
}

impl TimeSeries {
    /// Build a series from observation vectors, one per time step.
    pub fn new(points: Vec<Vec<f64>>) -> Result<Self> {
        if points.len() < MIN_SERIES_LEN {
            return Err(Error::SeriesTooShort {
                length: points.len(),
                min: MIN_SERIES_LEN,
            });
        }
        let dim = points[0].len();
        if dim == 0 {
            return Err(Error::Spec("series observations must be non-empty".into()));
        }
        for (t, p) in points.iter().enumerate() {
            if p.len() != dim {
                return Err(Error::DimensionMismatch {
                    declared: dim,
                    actual: p.len(),
                });
            }
            if let Some(v) = p.iter().find(|v| !v.is_finite()) {
                return Err(Error::NumericalInstability(format!(
                    "non-finite value {v} at step {t}"
                )));
            }
        }
        Ok(Self { dim, points })
    }

    /// Build a univariate series.
    pub fn univariate(values: Vec<f64>) -> Result<Self> {
        Self::new(values.into_iter().map(|v| vec![v]).collect())
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of variables per step.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Observation vector at step t.
    pub fn point(&self, t: usize) -> &[f64] {
        &self.points[t]
    }

    /// Value of variable `var` at step t.
    pub fn value(&self, t: usize, var: usize) -> f64 {
        self.points[t][var]
    }

    /// All values of one variable across time.
    pub fn variable(&self, var: usize) -> Vec<f64> {
        self.points.iter().map(|p| p[var]).collect()
    }

    /// Iterate over observation vectors in time order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.points.iter().map(|p| p.as_slice())
    }
}
