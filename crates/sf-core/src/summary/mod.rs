//! Posterior summarization.
//!
//! Consumes a [`PosteriorSampleSet`] — parameter draws grouped by
//! independent chains — and produces per-parameter means, standard
//! deviations, credible intervals, and convergence diagnostics. Chains
//! are summarized independently first and pooled explicitly afterwards;
//! a chain or parameter that fails a convergence check is flagged in
//! the report, never dropped.

pub mod diagnostics;

pub use diagnostics::{ess, split_rhat};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sf_common::{Error, Result};
use sf_math::{credible_interval, Moments, RunningMoments};
use uuid::Uuid;

/// Draws from one chain: `draws[iteration][parameter]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDraws {
    pub draws: Vec<Vec<f64>>,
}

/// Parameter draws grouped by chain, as returned by a sampling engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorSampleSet {
    /// Flattened parameter names, fixing the draw column order.
    pub parameters: Vec<String>,
    pub chains: Vec<ChainDraws>,
}

impl PosteriorSampleSet {
    /// Assemble a sample set, validating its shape.
    pub fn new(parameters: Vec<String>, chains: Vec<ChainDraws>) -> Result<Self> {
        if parameters.is_empty() {
            return Err(Error::Sampler("sample set declares no parameters".into()));
        }
        if chains.is_empty() {
            return Err(Error::Sampler("sample set contains no chains".into()));
        }
        let n = chains[0].draws.len();
        for (c, chain) in chains.iter().enumerate() {
            if chain.draws.len() != n {
                return Err(Error::ChainFailed {
                    chain: c,
                    diagnostic: format!(
                        "chain has {} draws, expected {n}",
                        chain.draws.len()
                    ),
                });
            }
            if let Some(draw) = chain.draws.iter().find(|d| d.len() != parameters.len()) {
                return Err(Error::ChainFailed {
                    chain: c,
                    diagnostic: format!(
                        "draw has {} values for {} parameters",
                        draw.len(),
                        parameters.len()
                    ),
                });
            }
        }
        Ok(Self { parameters, chains })
    }

    pub fn n_chains(&self) -> usize {
        self.chains.len()
    }

    /// Draws per chain.
    pub fn n_draws(&self) -> usize {
        self.chains.first().map_or(0, |c| c.draws.len())
    }

    /// Column index of a parameter by name.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p == name)
    }

    /// One parameter's draws, still grouped by chain.
    pub fn chain_values(&self, param: usize) -> Vec<Vec<f64>> {
        self.chains
            .iter()
            .map(|c| c.draws.iter().map(|d| d[param]).collect())
            .collect()
    }
}

/// Summarization settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SummaryOptions {
    /// Credible interval level.
    pub ci_level: f64,
    /// Split-Rhat above this flags the parameter.
    pub rhat_threshold: f64,
    /// Effective sample size below this flags the parameter.
    pub min_ess: f64,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            ci_level: 0.95,
            rhat_threshold: 1.05,
            min_ess: 100.0,
        }
    }
}

/// Summary of one flattened parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSummary {
    pub name: String,
    /// Pooled posterior mean.
    pub mean: f64,
    /// Pooled posterior standard deviation.
    pub sd: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub rhat: f64,
    pub ess: f64,
    /// Per-chain moments, retained from before pooling.
    pub per_chain: Vec<Moments>,
}

/// A convergence check that failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceFlag {
    pub parameter: String,
    /// The offending chain, when the check is chain-specific.
    pub chain: Option<usize>,
    pub diagnostic: String,
    pub value: f64,
    pub threshold: f64,
}

/// Full fit report, serializable for machine consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub model: String,
    pub ci_level: f64,
    pub n_chains: usize,
    pub n_draws_per_chain: usize,
    pub parameters: Vec<ParameterSummary>,
    pub flags: Vec<ConvergenceFlag>,
}

impl FitReport {
    /// Summarize a sample set into a report.
    pub fn build(
        model: &str,
        set: &PosteriorSampleSet,
        options: &SummaryOptions,
    ) -> Result<FitReport> {
        if !(options.ci_level > 0.0 && options.ci_level < 1.0) {
            return Err(Error::Spec(format!(
                "credible interval level must lie in (0, 1), got {}",
                options.ci_level
            )));
        }
        if set.n_draws() < 4 {
            return Err(Error::Sampler(format!(
                "too few draws per chain to summarize: {}",
                set.n_draws()
            )));
        }

        let mut parameters = Vec::with_capacity(set.parameters.len());
        let mut flags = Vec::new();

        for (idx, name) in set.parameters.iter().enumerate() {
            let by_chain = set.chain_values(idx);

            // Each chain first, independently.
            let per_chain: Vec<Moments> = by_chain
                .iter()
                .map(|chain| {
                    let mut acc = RunningMoments::new();
                    for &v in chain {
                        acc.push(v);
                    }
                    acc.finish()
                })
                .collect();

            // Explicit pooling step.
            let mut pooled_acc = RunningMoments::new();
            let mut pooled = Vec::with_capacity(set.n_chains() * set.n_draws());
            for chain in &by_chain {
                for &v in chain {
                    pooled_acc.push(v);
                    pooled.push(v);
                }
            }
            let mean = pooled_acc.mean();
            let sd = pooled_acc.sd();
            let (ci_lower, ci_upper) = credible_interval(&pooled, options.ci_level);

            let rhat = split_rhat(&by_chain);
            let ess = ess(&by_chain);

            if rhat.is_nan() {
                flags.push(ConvergenceFlag {
                    parameter: name.clone(),
                    chain: None,
                    diagnostic: "split_rhat undefined".into(),
                    value: f64::NAN,
                    threshold: options.rhat_threshold,
                });
            } else if rhat > options.rhat_threshold {
                flags.push(ConvergenceFlag {
                    parameter: name.clone(),
                    chain: None,
                    diagnostic: "split_rhat above threshold".into(),
                    value: rhat,
                    threshold: options.rhat_threshold,
                });
            }
            if ess.is_nan() || ess < options.min_ess {
                flags.push(ConvergenceFlag {
                    parameter: name.clone(),
                    chain: None,
                    diagnostic: "effective sample size below threshold".into(),
                    value: ess,
                    threshold: options.min_ess,
                });
            }

            // Chain-level check: a chain whose mean sits far from the
            // other chains (relative to its own spread) has not mixed.
            // The pooled sd is useless here: a stray chain inflates it.
            if per_chain.len() > 1 {
                for (c, moments) in per_chain.iter().enumerate() {
                    let within_sd = moments.variance.sqrt();
                    if !(within_sd.is_finite() && within_sd > 0.0) {
                        continue;
                    }
                    let others: f64 = per_chain
                        .iter()
                        .enumerate()
                        .filter(|(o, _)| *o != c)
                        .map(|(_, m)| m.mean)
                        .sum::<f64>()
                        / (per_chain.len() - 1) as f64;
                    let z = (moments.mean - others) / within_sd;
                    if z.abs() > 3.0 {
                        flags.push(ConvergenceFlag {
                            parameter: name.clone(),
                            chain: Some(c),
                            diagnostic: "chain mean far from the other chains".into(),
                            value: z.abs(),
                            threshold: 3.0,
                        });
                    }
                }
            }

            parameters.push(ParameterSummary {
                name: name.clone(),
                mean,
                sd,
                ci_lower,
                ci_upper,
                rhat,
                ess,
                per_chain,
            });
        }

        Ok(FitReport {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            model: model.to_string(),
            ci_level: options.ci_level,
            n_chains: set.n_chains(),
            n_draws_per_chain: set.n_draws(),
            parameters,
            flags,
        })
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSummary> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Whether every convergence check passed.
    pub fn is_converged(&self) -> bool {
        self.flags.is_empty()
    }

    /// One-line report for quick status checks.
    pub fn summary_line(&self) -> String {
        format!(
            "model={} chains={} draws={} parameters={} flags={}",
            self.model,
            self.n_chains,
            self.n_draws_per_chain,
            self.parameters.len(),
            self.flags.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    fn gaussian_set(mean: f64, sd: f64, chains: usize, draws: usize, seed: u64) -> PosteriorSampleSet {
        let mut rng = StdRng::seed_from_u64(seed);
        let chains = (0..chains)
            .map(|_| ChainDraws {
                draws: (0..draws)
                    .map(|_| vec![mean + sd * rng.sample::<f64, _>(StandardNormal)])
                    .collect(),
            })
            .collect();
        PosteriorSampleSet::new(vec!["theta".into()], chains).unwrap()
    }

    #[test]
    fn shape_validation() {
        assert!(PosteriorSampleSet::new(vec![], vec![]).is_err());
        assert!(PosteriorSampleSet::new(vec!["a".into()], vec![]).is_err());

        let uneven = vec![
            ChainDraws {
                draws: vec![vec![1.0], vec![2.0]],
            },
            ChainDraws {
                draws: vec![vec![1.0]],
            },
        ];
        assert!(matches!(
            PosteriorSampleSet::new(vec!["a".into()], uneven),
            Err(Error::ChainFailed { chain: 1, .. })
        ));

        let ragged = vec![ChainDraws {
            draws: vec![vec![1.0, 2.0]],
        }];
        assert!(PosteriorSampleSet::new(vec!["a".into()], ragged).is_err());
    }

    #[test]
    fn healthy_set_summarizes_without_flags() {
        let set = gaussian_set(2.0, 0.5, 4, 1000, 1);
        let report = FitReport::build("test_model", &set, &SummaryOptions::default()).unwrap();
        assert!(report.is_converged(), "flags: {:?}", report.flags);

        let theta = report.parameter("theta").unwrap();
        assert!((theta.mean - 2.0).abs() < 0.05);
        assert!((theta.sd - 0.5).abs() < 0.05);
        assert!(theta.ci_lower < 2.0 && 2.0 < theta.ci_upper);
        // 95% interval of N(2, 0.5): roughly (1.02, 2.98).
        assert!((theta.ci_lower - 1.02).abs() < 0.1);
        assert!((theta.ci_upper - 2.98).abs() < 0.1);
        assert_eq!(theta.per_chain.len(), 4);
    }

    #[test]
    fn shifted_chain_is_flagged_not_dropped() {
        let mut set = gaussian_set(0.0, 1.0, 4, 500, 2);
        // Shift the last chain far away.
        for draw in &mut set.chains[3].draws {
            draw[0] += 25.0;
        }
        let report = FitReport::build("test_model", &set, &SummaryOptions::default()).unwrap();
        assert!(!report.is_converged());
        assert!(report
            .flags
            .iter()
            .any(|f| f.diagnostic.contains("split_rhat")));
        assert!(report
            .flags
            .iter()
            .any(|f| f.chain == Some(3)));
        // All chains still contribute to the pooled summary.
        assert_eq!(report.n_chains, 4);
        let theta = report.parameter("theta").unwrap();
        assert!(theta.mean > 1.0, "pooled mean {}", theta.mean);
    }

    #[test]
    fn low_ess_is_flagged() {
        // A slowly mixing random walk has tiny effective sample size.
        let mut rng = StdRng::seed_from_u64(3);
        let mut x = 0.0;
        let chains: Vec<ChainDraws> = (0..2)
            .map(|_| ChainDraws {
                draws: (0..500)
                    .map(|_| {
                        x = 0.998 * x + 0.05 * rng.sample::<f64, _>(StandardNormal);
                        vec![x]
                    })
                    .collect(),
            })
            .collect();
        let set = PosteriorSampleSet::new(vec!["theta".into()], chains).unwrap();
        let report = FitReport::build("test_model", &set, &SummaryOptions::default()).unwrap();
        assert!(report
            .flags
            .iter()
            .any(|f| f.diagnostic.contains("effective sample size")));
    }

    #[test]
    fn rejects_bad_ci_level() {
        let set = gaussian_set(0.0, 1.0, 2, 100, 4);
        let opts = SummaryOptions {
            ci_level: 1.0,
            ..SummaryOptions::default()
        };
        assert!(matches!(
            FitReport::build("m", &set, &opts),
            Err(Error::Spec(_))
        ));
    }

    #[test]
    fn report_serializes_to_json() {
        let set = gaussian_set(1.0, 0.2, 2, 200, 5);
        let report = FitReport::build("test_model", &set, &SummaryOptions::default()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"model\":\"test_model\""));
        let back: FitReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.parameters.len(), 1);
    }
}
