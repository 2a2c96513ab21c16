//! Model specification adapter.
//!
//! Translates a [`ModelSpec`] plus a [`TimeSeries`] into the engine
//! input: a structured textual model description and a matching data
//! bundle. The output is deterministic — identical inputs produce
//! byte-identical descriptions and bundles (ordered maps, pure float
//! formatting, no clocks or RNG anywhere on this path).

use crate::model::{validate, ModelSpec, ParamDecl};
use crate::series::TimeSeries;
use serde::{Deserialize, Serialize};
use sf_common::Result;
use sf_config::Prior;
use sf_math::Support;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// A named value in the engine's data bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DataValue {
    Int(i64),
    Scalar(f64),
    Vector(Vec<f64>),
    Matrix {
        rows: usize,
        cols: usize,
        /// Row-major values.
        values: Vec<f64>,
    },
}

/// Named scalars, vectors, and matrices matching the model description.
///
/// Backed by a BTreeMap so serialization order (and therefore byte
/// identity) is independent of insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataBundle(pub BTreeMap<String, DataValue>);

impl DataBundle {
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.0.get(name)
    }

    fn insert(&mut self, name: &str, value: DataValue) {
        self.0.insert(name.to_string(), value);
    }
}

/// Engine-ready representation of one fitting problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineInput {
    /// Structured textual model description.
    pub model_code: String,
    /// Data bundle matching the declared dimensions in the description.
    pub data: DataBundle,
    /// The validated specification, carried for engines that interpret
    /// the model directly rather than compiling the description.
    pub spec: ModelSpec,
}

/// Build the engine input for a specification and series.
///
/// Fails fast on any validation problem; a returned `EngineInput` is
/// safe to hand to an engine as-is.
pub fn build_engine_input(spec: &ModelSpec, series: &TimeSeries) -> Result<EngineInput> {
    validate(spec, series)?;
    let decls = spec.parameters()?;

    Ok(EngineInput {
        model_code: render_model_code(spec, &decls, series),
        data: build_data_bundle(spec, series),
        spec: spec.clone(),
    })
}

fn series_matrix(series: &TimeSeries) -> DataValue {
    let rows = series.dim();
    let cols = series.len();
    let mut values = Vec::with_capacity(rows * cols);
    for var in 0..rows {
        values.extend(series.variable(var));
    }
    DataValue::Matrix { rows, cols, values }
}

fn build_data_bundle(spec: &ModelSpec, series: &TimeSeries) -> DataBundle {
    let mut data = DataBundle::default();
    data.insert("N", DataValue::Int(series.len() as i64));

    match spec {
        ModelSpec::LinearRegression { .. } => {
            data.insert("x", DataValue::Vector(series.variable(0)));
            data.insert("y", DataValue::Vector(series.variable(1)));
        }
        ModelSpec::VarDiagonal { dim, .. } | ModelSpec::VarFullCov { dim, .. } => {
            data.insert("K", DataValue::Int(*dim as i64));
            data.insert("y", series_matrix(series));
        }
        ModelSpec::VarConstrained { dim, mask, .. } => {
            data.insert("K", DataValue::Int(*dim as i64));
            data.insert("y", series_matrix(series));
            let values: Vec<f64> = mask
                .iter()
                .flatten()
                .map(|free| if *free { 1.0 } else { 0.0 })
                .collect();
            data.insert(
                "mask",
                DataValue::Matrix {
                    rows: *dim,
                    cols: *dim,
                    values,
                },
            );
        }
        ModelSpec::OdeLogistic {
            times,
            forcing_period,
            ..
        } => {
            data.insert("t", DataValue::Vector(times.clone()));
            data.insert("y", DataValue::Vector(series.variable(0)));
            if let Some(period) = forcing_period {
                data.insert("period", DataValue::Scalar(*period));
            }
        }
    }
    data
}

fn render_support(support: Support) -> String {
    match support {
        Support::Real => "real".to_string(),
        Support::Positive => "real<lower=0>".to_string(),
        Support::Interval { low, high } => format!("real<lower={low}, upper={high}>"),
    }
}

fn render_prior(prior: Prior) -> String {
    match prior {
        Prior::Normal { mean, sd } => format!("normal({mean}, {sd})"),
        Prior::HalfNormal { sd } => format!("half_normal({sd})"),
        Prior::Uniform { low, high } => format!("uniform({low}, {high})"),
    }
}

fn likelihood_lines(spec: &ModelSpec) -> Vec<String> {
    match spec {
        ModelSpec::LinearRegression { .. } => vec![
            "for (i in 1..N) y[i] ~ normal(intercept + slope * x[i], sigma);".to_string(),
        ],
        ModelSpec::VarDiagonal { .. } => vec![
            "for (t in 2..N) y[, t] ~ normal(phi * y[, t - 1], diag(sigma));".to_string(),
        ],
        ModelSpec::VarFullCov { .. } => vec![
            "Sigma = chol * chol';".to_string(),
            "for (t in 2..N) y[, t] ~ multi_normal(phi * y[, t - 1], Sigma);".to_string(),
        ],
        ModelSpec::VarConstrained { .. } => vec![
            "// masked entries of phi carry a tight zero-centered prior".to_string(),
            "for (t in 2..N) y[, t] ~ normal(phi * y[, t - 1], diag(sigma));".to_string(),
        ],
        ModelSpec::OdeLogistic { forcing_period, .. } => {
            let mut lines = vec![match forcing_period {
                Some(_) => {
                    "x' = growth_rate * x * (1 - x / capacity) + amplitude * sin(2 * pi * t / period);"
                        .to_string()
                }
                None => "x' = growth_rate * x * (1 - x / capacity);".to_string(),
            }];
            lines.push("x = ode_rk4(x', x0, t);".to_string());
            lines.push("for (i in 1..N) y[i] ~ normal(x[i], sigma);".to_string());
            lines
        }
    }
}

fn render_data_decl(name: &str, value: &DataValue) -> String {
    match value {
        DataValue::Int(v) => format!("int {name} = {v};"),
        DataValue::Scalar(v) => format!("real {name} = {v};"),
        DataValue::Vector(v) => format!("vector[{}] {name};", v.len()),
        DataValue::Matrix { rows, cols, .. } => format!("matrix[{rows}, {cols}] {name};"),
    }
}

fn render_model_code(spec: &ModelSpec, decls: &[ParamDecl], series: &TimeSeries) -> String {
    let data = build_data_bundle(spec, series);

    let mut code = String::new();
    let _ = writeln!(code, "model {} {{", spec.name());

    let _ = writeln!(code, "  data {{");
    for (name, value) in &data.0 {
        let _ = writeln!(code, "    {}", render_data_decl(name, value));
    }
    let _ = writeln!(code, "  }}");

    let _ = writeln!(code, "  parameters {{");
    for decl in decls {
        let _ = writeln!(code, "    {} {};", render_support(decl.support), decl.name);
    }
    let _ = writeln!(code, "  }}");

    let _ = writeln!(code, "  priors {{");
    for decl in decls {
        let _ = writeln!(code, "    {} ~ {};", decl.name, render_prior(decl.prior));
    }
    let _ = writeln!(code, "  }}");

    let _ = writeln!(code, "  likelihood {{");
    for line in likelihood_lines(spec) {
        let _ = writeln!(code, "    {line}");
    }
    let _ = writeln!(code, "  }}");

    code.push_str("}\n");
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{simulate_regression, simulate_var, stable_phi, NoiseSpec, RegressionConfig};
    use sf_common::Error;
    use sf_config::PresetName;

    #[test]
    fn identical_inputs_are_byte_identical() {
        let series = simulate_regression(&RegressionConfig::default(), 11).unwrap();
        let spec = ModelSpec::LinearRegression {
            priors: PresetName::Diffuse.regression(),
        };
        let a = build_engine_input(&spec, &series).unwrap();
        let b = build_engine_input(&spec, &series).unwrap();
        assert_eq!(a.model_code, b.model_code);
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn regression_bundle_shape() {
        let series = simulate_regression(&RegressionConfig::default(), 1).unwrap();
        let spec = ModelSpec::LinearRegression {
            priors: PresetName::Diffuse.regression(),
        };
        let input = build_engine_input(&spec, &series).unwrap();
        assert_eq!(input.data.get("N"), Some(&DataValue::Int(100)));
        match input.data.get("x") {
            Some(DataValue::Vector(v)) => assert_eq!(v.len(), 100),
            other => panic!("unexpected x entry: {other:?}"),
        }
        assert!(input.model_code.contains("slope ~ normal(0, 10);"));
        assert!(input.model_code.contains("real<lower=0> sigma;"));
    }

    #[test]
    fn var_bundle_carries_row_major_matrix() {
        let phi = stable_phi(2, 0.6, 4).unwrap();
        let series = simulate_var(&phi, &NoiseSpec::Diagonal(vec![1.0, 1.0]), 20, 4).unwrap();
        let spec = ModelSpec::VarDiagonal {
            dim: 2,
            priors: PresetName::Diffuse.var(),
        };
        let input = build_engine_input(&spec, &series).unwrap();
        match input.data.get("y") {
            Some(DataValue::Matrix { rows, cols, values }) => {
                assert_eq!((*rows, *cols), (2, 20));
                assert_eq!(values[0], series.value(0, 0));
                assert_eq!(values[20], series.value(0, 1));
            }
            other => panic!("unexpected y entry: {other:?}"),
        }
    }

    #[test]
    fn constrained_bundle_carries_mask() {
        let phi = stable_phi(2, 0.6, 5).unwrap();
        let series = simulate_var(&phi, &NoiseSpec::Diagonal(vec![1.0, 1.0]), 20, 5).unwrap();
        let spec = ModelSpec::VarConstrained {
            dim: 2,
            mask: vec![vec![true, false], vec![false, true]],
            priors: PresetName::Diffuse.var(),
        };
        let input = build_engine_input(&spec, &series).unwrap();
        match input.data.get("mask") {
            Some(DataValue::Matrix { values, .. }) => {
                assert_eq!(values, &vec![1.0, 0.0, 0.0, 1.0]);
            }
            other => panic!("unexpected mask entry: {other:?}"),
        }
        // The pinned prior shows up in the description.
        assert!(input.model_code.contains("phi[0][1] ~ normal(0, 0.01);"));
    }

    #[test]
    fn length_one_series_is_rejected_before_adaptation() {
        // A single observation cannot even form a TimeSeries; the
        // validation error carries the boundary.
        let err = TimeSeries::univariate(vec![1.0]).unwrap_err();
        assert!(matches!(err, Error::SeriesTooShort { length: 1, min: 2 }));
    }

    #[test]
    fn mismatched_series_is_rejected() {
        let series = TimeSeries::univariate(vec![1.0, 2.0, 3.0]).unwrap();
        let spec = ModelSpec::VarDiagonal {
            dim: 2,
            priors: PresetName::Diffuse.var(),
        };
        assert!(matches!(
            build_engine_input(&spec, &series),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn ode_description_mentions_forcing_only_when_declared() {
        let times: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let series = TimeSeries::univariate((0..10).map(|i| 1.0 + i as f64).collect()).unwrap();
        let priors = PresetName::Diffuse.ode();

        let quiet = ModelSpec::OdeLogistic {
            times: times.clone(),
            forcing_period: None,
            priors,
        };
        let forced = ModelSpec::OdeLogistic {
            times,
            forcing_period: Some(6.0),
            priors,
        };

        let quiet_input = build_engine_input(&quiet, &series).unwrap();
        let forced_input = build_engine_input(&forced, &series).unwrap();
        assert!(!quiet_input.model_code.contains("amplitude"));
        assert!(forced_input.model_code.contains("amplitude * sin"));
        assert!(forced_input.data.get("period").is_some());
    }
}
