//! Cross-validation of a model specification against a time series.
//!
//! Everything here runs before the sampling engine is invoked; a
//! specification that passes has consistent dimensions, a usable time
//! grid, and priors compatible with every parameter's support.

use crate::generate::ode::validate_times;
use crate::model::ModelSpec;
use crate::series::TimeSeries;
use sf_common::{Error, Result};

/// Validate a specification against the series it will be fit to.
pub fn validate(spec: &ModelSpec, series: &TimeSeries) -> Result<()> {
    let declared = spec.series_dim();
    if declared == 0 {
        return Err(Error::Spec("model dimension must be >= 1".into()));
    }
    if series.dim() != declared {
        return Err(Error::DimensionMismatch {
            declared,
            actual: series.dim(),
        });
    }

    match spec {
        ModelSpec::VarConstrained { dim, mask, .. } => {
            if mask.len() != *dim || mask.iter().any(|row| row.len() != *dim) {
                return Err(Error::Spec(format!(
                    "constraint mask must be {dim}x{dim}"
                )));
            }
            if mask.iter().flatten().all(|free| !free) {
                return Err(Error::Spec(
                    "constraint mask pins every transition entry; nothing to estimate".into(),
                ));
            }
        }
        ModelSpec::OdeLogistic { times, .. } => {
            validate_times(times)?;
            if times.len() != series.len() {
                return Err(Error::Spec(format!(
                    "observation grid has {} times but the series has {} steps",
                    times.len(),
                    series.len()
                )));
            }
        }
        _ => {}
    }

    // Prior/support consistency is checked during flattening.
    spec.parameters()?;
    Ok(())
}
