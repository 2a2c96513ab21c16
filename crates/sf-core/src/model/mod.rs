//! Model specifications.
//!
//! A [`ModelSpec`] is a declarative, immutable bundle of parameter
//! declarations, priors, and a likelihood form. The supported model
//! kinds are a tagged union so that unsupported parameter combinations
//! are unrepresentable: each variant carries only the fields that kind
//! needs.
//!
//! Specifications are *flattened* into scalar [`ParamDecl`]s (one per
//! matrix/vector element) before anything downstream sees them; engines
//! and summaries work entirely in terms of the flattened names, e.g.
//! `phi[1][2]` or `sigma[0]`.

pub mod validate;

use serde::{Deserialize, Serialize};
use sf_common::{Error, Result};
use sf_config::{OdePriors, Prior, RegressionPriors, VarPriors};
use sf_math::Support;

pub use validate::validate;

/// A declared statistical model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    /// Affine mean with Gaussian noise: y = intercept + slope * x + eps.
    LinearRegression { priors: RegressionPriors },

    /// VAR(1) dynamics with independent per-variable noise.
    VarDiagonal { dim: usize, priors: VarPriors },

    /// VAR(1) dynamics with a dense covariance estimated jointly with
    /// the dynamics matrix, parameterized by its Cholesky factor.
    VarFullCov { dim: usize, priors: VarPriors },

    /// VAR(1) dynamics with known sparsity: masked-out entries of the
    /// transition matrix get a tight zero-centered prior.
    VarConstrained {
        dim: usize,
        /// mask[i][j] = true means entry (i, j) is freely estimated;
        /// false pins it near zero.
        mask: Vec<Vec<bool>>,
        priors: VarPriors,
    },

    /// Logistic growth observed with Gaussian noise, integrated by RK4,
    /// with an optional sinusoidal forcing term of declared period.
    OdeLogistic {
        /// Observation times, strictly increasing, one per series step.
        times: Vec<f64>,
        /// Period of the additive forcing term, if any. The amplitude
        /// is estimated; the period is part of the specification.
        forcing_period: Option<f64>,
        priors: OdePriors,
    },
}

/// One flattened scalar parameter of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub support: Support,
    pub prior: Prior,
}

impl ParamDecl {
    /// Build a declaration, refining the declared support against the
    /// prior so the sampler's transform always matches the prior's
    /// actual support.
    fn new(name: String, declared: Support, prior: Prior) -> Result<Self> {
        let support = match (declared, prior) {
            // A uniform prior bounds the parameter even when the model
            // itself declares it unbounded.
            (Support::Real, Prior::Uniform { low, high }) => Support::Interval { low, high },
            (Support::Positive, Prior::Uniform { low, high }) => {
                if high <= 0.0 {
                    return Err(Error::InvalidPrior {
                        parameter: name,
                        message: format!(
                            "uniform prior [{low}, {high}] lies outside the strictly-positive support"
                        ),
                    });
                }
                if low < 0.0 {
                    return Err(Error::InvalidPrior {
                        parameter: name,
                        message: format!(
                            "uniform prior [{low}, {high}] extends below zero for a strictly-positive parameter"
                        ),
                    });
                }
                Support::Interval { low, high }
            }
            // A half-normal prior implies non-negativity.
            (Support::Real, Prior::HalfNormal { .. }) => Support::Positive,
            (Support::Positive, Prior::Normal { mean, .. }) => {
                if mean < 0.0 {
                    return Err(Error::InvalidPrior {
                        parameter: name,
                        message: format!(
                            "normal prior centered at {mean} for a strictly-positive parameter"
                        ),
                    });
                }
                Support::Positive
            }
            (declared, _) => declared,
        };
        Ok(Self {
            name,
            support,
            prior,
        })
    }
}

impl ModelSpec {
    /// Stable identifier for the model kind.
    pub fn name(&self) -> &'static str {
        match self {
            ModelSpec::LinearRegression { .. } => "linear_regression",
            ModelSpec::VarDiagonal { .. } => "var_diagonal",
            ModelSpec::VarFullCov { .. } => "var_full_cov",
            ModelSpec::VarConstrained { .. } => "var_constrained",
            ModelSpec::OdeLogistic { .. } => "ode_logistic",
        }
    }

    /// Dimensionality of the series this model expects.
    pub fn series_dim(&self) -> usize {
        match self {
            // Variable 0 is the predictor, variable 1 the response.
            ModelSpec::LinearRegression { .. } => 2,
            ModelSpec::VarDiagonal { dim, .. }
            | ModelSpec::VarFullCov { dim, .. }
            | ModelSpec::VarConstrained { dim, .. } => *dim,
            ModelSpec::OdeLogistic { .. } => 1,
        }
    }

    /// Flattened scalar parameter declarations, in sampling order.
    ///
    /// Fails fast when a prior is inconsistent with its parameter's
    /// support or has invalid hyperparameters.
    pub fn parameters(&self) -> Result<Vec<ParamDecl>> {
        let mut decls = Vec::new();
        let mut push = |name: String, support: Support, prior: Prior| -> Result<()> {
            sf_config::validate_prior(&name, &prior).map_err(|e| Error::InvalidPrior {
                parameter: name.clone(),
                message: e.to_string(),
            })?;
            decls.push(ParamDecl::new(name, support, prior)?);
            Ok(())
        };

        match self {
            ModelSpec::LinearRegression { priors } => {
                push("slope".into(), Support::Real, priors.slope)?;
                push("intercept".into(), Support::Real, priors.intercept)?;
                push("sigma".into(), Support::Positive, priors.noise_sd)?;
            }
            ModelSpec::VarDiagonal { dim, priors } => {
                for i in 0..*dim {
                    for j in 0..*dim {
                        push(format!("phi[{i}][{j}]"), Support::Real, priors.coeff)?;
                    }
                }
                for i in 0..*dim {
                    push(format!("sigma[{i}]"), Support::Positive, priors.noise_sd)?;
                }
            }
            ModelSpec::VarFullCov { dim, priors } => {
                for i in 0..*dim {
                    for j in 0..*dim {
                        push(format!("phi[{i}][{j}]"), Support::Real, priors.coeff)?;
                    }
                }
                // Cholesky factor of the noise covariance, row by row:
                // positive diagonal, unconstrained below-diagonal.
                for i in 0..*dim {
                    for j in 0..=i {
                        if i == j {
                            push(format!("chol[{i}][{j}]"), Support::Positive, priors.noise_sd)?;
                        } else {
                            push(format!("chol[{i}][{j}]"), Support::Real, priors.chol_offdiag)?;
                        }
                    }
                }
            }
            ModelSpec::VarConstrained { dim, mask, priors } => {
                let pinned = Prior::Normal {
                    mean: 0.0,
                    sd: priors.pinned_sd,
                };
                for i in 0..*dim {
                    for j in 0..*dim {
                        let free = mask
                            .get(i)
                            .and_then(|row| row.get(j))
                            .copied()
                            .unwrap_or(false);
                        let prior = if free { priors.coeff } else { pinned };
                        push(format!("phi[{i}][{j}]"), Support::Real, prior)?;
                    }
                }
                for i in 0..*dim {
                    push(format!("sigma[{i}]"), Support::Positive, priors.noise_sd)?;
                }
            }
            ModelSpec::OdeLogistic {
                forcing_period,
                priors,
                ..
            } => {
                push("growth_rate".into(), Support::Positive, priors.growth_rate)?;
                push("capacity".into(), Support::Positive, priors.capacity)?;
                push("x0".into(), Support::Positive, priors.initial_state)?;
                push("sigma".into(), Support::Positive, priors.noise_sd)?;
                if forcing_period.is_some() {
                    push("amplitude".into(), Support::Real, priors.forcing_amplitude)?;
                }
            }
        }
        Ok(decls)
    }
}
