//! Prior configuration for series_fit.
//!
//! Serde types for prior hyperparameters, presets per model family, JSON
//! load/save, and fail-fast semantic validation. Model specifications in
//! sf-core embed these types; everything here is validated before any
//! sampling engine is invoked.

pub mod preset;
pub mod priors;
pub mod validate;

pub use preset::PresetName;
pub use priors::{OdePriors, Prior, PriorsFile, RegressionPriors, VarPriors};
pub use validate::{validate_prior, validate_priors_file, ValidationError, ValidationResult};

use std::path::Path;

/// Schema version accepted by this build.
pub const CONFIG_SCHEMA_VERSION: &str = "1";

/// Load and validate a priors file from disk.
pub fn load_priors_file(path: &Path) -> ValidationResult<PriorsFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ValidationError::IoError(format!("{}: {e}", path.display())))?;
    let file: PriorsFile =
        serde_json::from_str(&raw).map_err(|e| ValidationError::ParseError(e.to_string()))?;
    validate_priors_file(&file)?;
    Ok(file)
}

/// Serialize a priors file to pretty JSON.
pub fn priors_file_to_json(file: &PriorsFile) -> ValidationResult<String> {
    serde_json::to_string_pretty(file).map_err(|e| ValidationError::ParseError(e.to_string()))
}
