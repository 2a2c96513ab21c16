//! Prior presets for the bundled model families.
//!
//! Two presets cover the common starting points:
//! - Diffuse: weakly-informative priors for exploratory fits
//! - Informative: tighter scales for well-understood, unit-scale data

use crate::priors::{OdePriors, Prior, PriorsFile, RegressionPriors, VarPriors};
use crate::CONFIG_SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Available prior presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Weakly-informative priors, wide enough for unscaled data
    Diffuse,
    /// Tighter priors for data already near unit scale
    Informative,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[PresetName::Diffuse, PresetName::Informative];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Diffuse => "diffuse",
            PresetName::Informative => "informative",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "diffuse" | "weak" | "wide" => Some(PresetName::Diffuse),
            "informative" | "tight" => Some(PresetName::Informative),
            _ => None,
        }
    }

    pub fn regression(self) -> RegressionPriors {
        match self {
            PresetName::Diffuse => RegressionPriors {
                slope: Prior::Normal { mean: 0.0, sd: 10.0 },
                intercept: Prior::Normal { mean: 0.0, sd: 10.0 },
                noise_sd: Prior::HalfNormal { sd: 5.0 },
            },
            PresetName::Informative => RegressionPriors {
                slope: Prior::Normal { mean: 0.0, sd: 2.0 },
                intercept: Prior::Normal { mean: 0.0, sd: 2.0 },
                noise_sd: Prior::HalfNormal { sd: 1.0 },
            },
        }
    }

    pub fn var(self) -> VarPriors {
        match self {
            PresetName::Diffuse => VarPriors {
                coeff: Prior::Normal { mean: 0.0, sd: 1.0 },
                noise_sd: Prior::HalfNormal { sd: 2.0 },
                chol_offdiag: Prior::Normal { mean: 0.0, sd: 1.0 },
                pinned_sd: 0.01,
            },
            PresetName::Informative => VarPriors {
                // Stable dynamics keep entries well inside the unit disc
                coeff: Prior::Normal { mean: 0.0, sd: 0.5 },
                noise_sd: Prior::HalfNormal { sd: 1.0 },
                chol_offdiag: Prior::Normal { mean: 0.0, sd: 0.5 },
                pinned_sd: 0.01,
            },
        }
    }

    pub fn ode(self) -> OdePriors {
        match self {
            PresetName::Diffuse => OdePriors {
                growth_rate: Prior::HalfNormal { sd: 2.0 },
                capacity: Prior::HalfNormal { sd: 100.0 },
                initial_state: Prior::HalfNormal { sd: 10.0 },
                noise_sd: Prior::HalfNormal { sd: 5.0 },
                forcing_amplitude: Prior::Normal { mean: 0.0, sd: 2.0 },
            },
            PresetName::Informative => OdePriors {
                growth_rate: Prior::HalfNormal { sd: 1.0 },
                capacity: Prior::HalfNormal { sd: 20.0 },
                initial_state: Prior::HalfNormal { sd: 2.0 },
                noise_sd: Prior::HalfNormal { sd: 1.0 },
                forcing_amplitude: Prior::Normal { mean: 0.0, sd: 1.0 },
            },
        }
    }
}

impl std::fmt::Display for PresetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PriorsFile {
    /// Build a complete priors file from a preset.
    pub fn preset(name: PresetName) -> Self {
        PriorsFile {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            description: Some(format!("{name} preset")),
            regression: Some(name.regression()),
            var: Some(name.var()),
            ode: Some(name.ode()),
        }
    }
}
