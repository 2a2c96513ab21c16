//! Prior hyperparameter types.
//!
//! One `Prior` per declared parameter; model families bundle them into
//! small structs embedded by the model specifications in sf-core.

use serde::{Deserialize, Serialize};
use sf_math::{half_normal_log_pdf, normal_log_pdf, uniform_log_pdf};

/// A univariate prior distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dist", rename_all = "snake_case")]
pub enum Prior {
    /// Gaussian prior on an unbounded parameter.
    Normal { mean: f64, sd: f64 },
    /// Half-normal prior on a non-negative scale parameter.
    HalfNormal { sd: f64 },
    /// Flat prior on a bounded interval.
    Uniform { low: f64, high: f64 },
}

impl Prior {
    /// Log density at x.
    pub fn log_pdf(&self, x: f64) -> f64 {
        match *self {
            Prior::Normal { mean, sd } => normal_log_pdf(x, mean, sd),
            Prior::HalfNormal { sd } => half_normal_log_pdf(x, sd),
            Prior::Uniform { low, high } => uniform_log_pdf(x, low, high),
        }
    }

    /// A central value of the prior, used to initialize sampler chains.
    pub fn central(&self) -> f64 {
        match *self {
            Prior::Normal { mean, .. } => mean,
            // Median of a half-normal is ~0.674 sd; close enough for an
            // initialization point that must lie strictly inside support.
            Prior::HalfNormal { sd } => 0.674 * sd,
            Prior::Uniform { low, high } => 0.5 * (low + high),
        }
    }

    /// A dispersion scale of the prior, used to seed proposal step sizes.
    pub fn scale(&self) -> f64 {
        match *self {
            Prior::Normal { sd, .. } => sd,
            Prior::HalfNormal { sd } => sd,
            Prior::Uniform { low, high } => (high - low) / 12f64.sqrt(),
        }
    }
}

/// Priors for the linear regression model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionPriors {
    pub slope: Prior,
    pub intercept: Prior,
    pub noise_sd: Prior,
}

/// Priors for the VAR(1) model families.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarPriors {
    /// Shared prior over free transition-matrix entries.
    pub coeff: Prior,
    /// Prior over per-variable noise scales (diagonal case) or Cholesky
    /// diagonal entries (full-covariance case).
    pub noise_sd: Prior,
    /// Prior over below-diagonal Cholesky entries (full-covariance case).
    pub chol_offdiag: Prior,
    /// Standard deviation of the tight zero-centered prior applied to
    /// masked transition entries in the structurally constrained model.
    pub pinned_sd: f64,
}

/// Priors for the logistic-growth ODE model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OdePriors {
    pub growth_rate: Prior,
    pub capacity: Prior,
    pub initial_state: Prior,
    pub noise_sd: Prior,
    /// Prior over the forcing amplitude; only consulted when the model
    /// declares a forcing term.
    pub forcing_amplitude: Prior,
}

/// On-disk priors configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorsFile {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub regression: Option<RegressionPriors>,

    #[serde(default)]
    pub var: Option<VarPriors>,

    #[serde(default)]
    pub ode: Option<OdePriors>,
}
