//! Semantic validation of prior configurations.

use crate::priors::{OdePriors, Prior, PriorsFile, RegressionPriors, VarPriors};
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Prior configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::VersionMismatch { .. } => 62,
            ValidationError::InvalidValue { .. } => 63,
        }
    }
}

/// Validate a single prior's hyperparameters.
pub fn validate_prior(field: &str, prior: &Prior) -> ValidationResult<()> {
    let invalid = |message: String| ValidationError::InvalidValue {
        field: field.to_string(),
        message,
    };

    match *prior {
        Prior::Normal { mean, sd } => {
            if !mean.is_finite() {
                return Err(invalid(format!("mean must be finite, got {mean}")));
            }
            if !(sd.is_finite() && sd > 0.0) {
                return Err(invalid(format!("sd must be positive and finite, got {sd}")));
            }
        }
        Prior::HalfNormal { sd } => {
            if !(sd.is_finite() && sd > 0.0) {
                return Err(invalid(format!("sd must be positive and finite, got {sd}")));
            }
        }
        Prior::Uniform { low, high } => {
            if !low.is_finite() || !high.is_finite() {
                return Err(invalid(format!("bounds must be finite, got [{low}, {high}]")));
            }
            if low >= high {
                return Err(invalid(format!("low must be below high, got [{low}, {high}]")));
            }
        }
    }
    Ok(())
}

fn validate_regression(p: &RegressionPriors) -> ValidationResult<()> {
    validate_prior("regression.slope", &p.slope)?;
    validate_prior("regression.intercept", &p.intercept)?;
    validate_prior("regression.noise_sd", &p.noise_sd)?;
    Ok(())
}

fn validate_var(p: &VarPriors) -> ValidationResult<()> {
    validate_prior("var.coeff", &p.coeff)?;
    validate_prior("var.noise_sd", &p.noise_sd)?;
    validate_prior("var.chol_offdiag", &p.chol_offdiag)?;
    if !(p.pinned_sd.is_finite() && p.pinned_sd > 0.0) {
        return Err(ValidationError::InvalidValue {
            field: "var.pinned_sd".to_string(),
            message: format!("must be positive and finite, got {}", p.pinned_sd),
        });
    }
    Ok(())
}

fn validate_ode(p: &OdePriors) -> ValidationResult<()> {
    validate_prior("ode.growth_rate", &p.growth_rate)?;
    validate_prior("ode.capacity", &p.capacity)?;
    validate_prior("ode.initial_state", &p.initial_state)?;
    validate_prior("ode.noise_sd", &p.noise_sd)?;
    validate_prior("ode.forcing_amplitude", &p.forcing_amplitude)?;
    Ok(())
}

/// Validate a priors file semantically.
pub fn validate_priors_file(file: &PriorsFile) -> ValidationResult<()> {
    if file.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: file.schema_version.clone(),
        });
    }

    if let Some(reg) = &file.regression {
        validate_regression(reg)?;
    }
    if let Some(var) = &file.var {
        validate_var(var)?;
    }
    if let Some(ode) = &file.ode {
        validate_ode(ode)?;
    }
    Ok(())
}
