//! Error types for series_fit.
//!
//! Structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints (can a different input fix this?)
//! - Remediation suggestions for humans
//!
//! Nothing in the pipeline retries automatically: every failure is
//! surfaced to the caller, who decides whether to reparameterize, loosen
//! tolerances, or rescale data.
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 12,
//!   "category": "validation",
//!   "message": "time series too short: 1 observation(s), need at least 2",
//!   "recoverable": true,
//!   "context": { "length": 1 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for series_fit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed model specifications, priors, or input data. Caught
    /// before any engine invocation.
    Validation,
    /// Non-finite or divergent numerics during generation/integration.
    Numerical,
    /// Failures reported by (or around) the sampling engine.
    Sampler,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Numerical => write!(f, "numerical"),
            ErrorCategory::Sampler => write!(f, "sampler"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for series_fit.
#[derive(Error, Debug)]
pub enum Error {
    // Validation errors (10-19)
    #[error("invalid model specification: {0}")]
    Spec(String),

    #[error("dimension mismatch: model declares {declared}, series has {actual}")]
    DimensionMismatch { declared: usize, actual: usize },

    #[error("time series too short: {length} observation(s), need at least {min}")]
    SeriesTooShort { length: usize, min: usize },

    #[error("invalid prior for {parameter}: {message}")]
    InvalidPrior { parameter: String, message: String },

    #[error("malformed input table at line {line}: {message}")]
    TableSchema { line: usize, message: String },

    // Numerical errors (20-29)
    #[error("generated series diverged at step {step}: non-finite value")]
    DivergentSeries { step: usize },

    #[error("ODE integration exceeded step budget of {max_steps}")]
    OdeStepBudget { max_steps: usize },

    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    // Sampler errors (30-39)
    #[error("sampling engine failed: {0}")]
    Sampler(String),

    #[error("chain {chain} failed: {diagnostic}")]
    ChainFailed { chain: usize, diagnostic: String },

    #[error("sampler exceeded timeout of {seconds}s")]
    SamplerTimeout { seconds: u64 },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the stable error code for this error type.
    ///
    /// Codes are grouped by category:
    /// - 10-19: Validation errors
    /// - 20-29: Numerical errors
    /// - 30-39: Sampler errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Spec(_) => 10,
            Error::DimensionMismatch { .. } => 11,
            Error::SeriesTooShort { .. } => 12,
            Error::InvalidPrior { .. } => 13,
            Error::TableSchema { .. } => 14,
            Error::DivergentSeries { .. } => 20,
            Error::OdeStepBudget { .. } => 21,
            Error::NumericalInstability(_) => 22,
            Error::Sampler(_) => 30,
            Error::ChainFailed { .. } => 31,
            Error::SamplerTimeout { .. } => 32,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Spec(_)
            | Error::DimensionMismatch { .. }
            | Error::SeriesTooShort { .. }
            | Error::InvalidPrior { .. }
            | Error::TableSchema { .. } => ErrorCategory::Validation,

            Error::DivergentSeries { .. }
            | Error::OdeStepBudget { .. }
            | Error::NumericalInstability(_) => ErrorCategory::Numerical,

            Error::Sampler(_) | Error::ChainFailed { .. } | Error::SamplerTimeout { .. } => {
                ErrorCategory::Sampler
            }

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Whether a different input could plausibly fix this error.
    ///
    /// Validation and numerical errors are fixable by reparameterizing or
    /// rescaling; a sampler timeout by a longer budget. None of these are
    /// retried automatically.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Spec(_) => true,
            Error::DimensionMismatch { .. } => true,
            Error::SeriesTooShort { .. } => true,
            Error::InvalidPrior { .. } => true,
            Error::TableSchema { .. } => true,

            // A fresh draw or a stabler process can succeed
            Error::DivergentSeries { .. } => true,
            Error::OdeStepBudget { .. } => true,
            Error::NumericalInstability(_) => false,

            Error::Sampler(_) => false,
            Error::ChainFailed { .. } => true,
            Error::SamplerTimeout { .. } => true,

            Error::Io(_) => true,
            Error::Json(_) => true,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Spec(_) => {
                "Run 'seriesfit check' against the spec file to locate the malformed field."
            }
            Error::DimensionMismatch { .. } => {
                "Make the model dimension match the number of rows in the input table."
            }
            Error::SeriesTooShort { .. } => {
                "Provide at least two time points; the likelihood needs one transition."
            }
            Error::InvalidPrior { .. } => {
                "Check prior hyperparameters: scales must be positive and bounds consistent with the parameter's support."
            }
            Error::TableSchema { .. } => {
                "Ensure every row has the same number of comma-separated numeric columns."
            }

            Error::DivergentSeries { .. } => {
                "The generating process is unstable. Rescale the transition matrix (spectral radius < 1) or reduce noise."
            }
            Error::OdeStepBudget { .. } => {
                "Raise max_steps, shorten the time grid, or loosen integration tolerances."
            }
            Error::NumericalInstability(_) => {
                "Rescale the data toward unit magnitude and refit."
            }

            Error::Sampler(_) => {
                "Inspect the engine diagnostic; reparameterizing the model usually helps."
            }
            Error::ChainFailed { .. } => {
                "Check the named chain's diagnostic. Consider more warm-up iterations or tighter priors."
            }
            Error::SamplerTimeout { .. } => {
                "Increase the timeout, reduce iterations, or simplify the model."
            }

            Error::Io(_) => {
                "Check that the path exists and is readable, then retry the command."
            }
            Error::Json(_) => {
                "Invalid JSON. Check the file syntax and restore from a known-good copy."
            }
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Spec(_) => "Invalid Model Specification",
            Error::DimensionMismatch { .. } => "Dimension Mismatch",
            Error::SeriesTooShort { .. } => "Series Too Short",
            Error::InvalidPrior { .. } => "Invalid Prior",
            Error::TableSchema { .. } => "Malformed Input Table",
            Error::DivergentSeries { .. } => "Divergent Series",
            Error::OdeStepBudget { .. } => "ODE Step Budget Exceeded",
            Error::NumericalInstability(_) => "Numerical Instability",
            Error::Sampler(_) => "Sampler Failure",
            Error::ChainFailed { .. } => "Chain Failed",
            Error::SamplerTimeout { .. } => "Sampler Timeout",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether a different input could fix the error.
    pub recoverable: bool,

    /// Additional structured context (e.g. chain index, line number).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::DimensionMismatch { declared, actual } => {
                context.insert("declared".to_string(), serde_json::json!(declared));
                context.insert("actual".to_string(), serde_json::json!(actual));
            }
            Error::SeriesTooShort { length, min } => {
                context.insert("length".to_string(), serde_json::json!(length));
                context.insert("min".to_string(), serde_json::json!(min));
            }
            Error::TableSchema { line, .. } => {
                context.insert("line".to_string(), serde_json::json!(line));
            }
            Error::DivergentSeries { step } => {
                context.insert("step".to_string(), serde_json::json!(step));
            }
            Error::OdeStepBudget { max_steps } => {
                context.insert("max_steps".to_string(), serde_json::json!(max_steps));
            }
            Error::ChainFailed { chain, .. } => {
                context.insert("chain".to_string(), serde_json::json!(chain));
            }
            Error::SamplerTimeout { seconds } => {
                context.insert("timeout_seconds".to_string(), serde_json::json!(seconds));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(Error::Spec("x".into()).code(), 10);
        assert_eq!(
            Error::SeriesTooShort { length: 1, min: 2 }.code(),
            12
        );
        assert_eq!(Error::DivergentSeries { step: 7 }.code(), 20);
        assert_eq!(Error::SamplerTimeout { seconds: 30 }.code(), 32);
    }

    #[test]
    fn categories_group_variants() {
        assert_eq!(
            Error::InvalidPrior {
                parameter: "sigma".into(),
                message: "sd must be positive".into()
            }
            .category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            Error::OdeStepBudget { max_steps: 1000 }.category(),
            ErrorCategory::Numerical
        );
        assert_eq!(
            Error::ChainFailed {
                chain: 2,
                diagnostic: "non-finite log density".into()
            }
            .category(),
            ErrorCategory::Sampler
        );
    }

    #[test]
    fn recoverability_hints() {
        assert!(Error::SeriesTooShort { length: 1, min: 2 }.is_recoverable());
        assert!(Error::SamplerTimeout { seconds: 10 }.is_recoverable());
        assert!(!Error::Sampler("model failed to evaluate".into()).is_recoverable());
    }

    #[test]
    fn structured_error_carries_context() {
        let err = Error::ChainFailed {
            chain: 3,
            diagnostic: "diverged".into(),
        };
        let structured = StructuredError::from(&err);
        assert_eq!(structured.code, 31);
        assert_eq!(structured.category, ErrorCategory::Sampler);
        assert_eq!(structured.context.get("chain"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn structured_error_json_shape() {
        let err = Error::SamplerTimeout { seconds: 60 };
        let json = StructuredError::from(&err).to_json();
        assert!(json.contains(r#""code":32"#));
        assert!(json.contains(r#""category":"sampler""#));
        assert!(json.contains(r#""recoverable":true"#));
    }

    #[test]
    fn human_format_includes_fix() {
        let err = Error::SeriesTooShort { length: 1, min: 2 };
        let out = format_error_human(&err, false);
        assert!(out.contains("Series Too Short"));
        assert!(out.contains("need at least 2"));
        assert!(out.contains("one transition"));
    }

    #[test]
    fn category_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::Sampler.to_string(), "sampler");
    }
}
