//! Command-line surface for seriesfit.
//!
//! Three subcommands cover the pipeline end to end:
//! - `simulate`: generate a synthetic series to a table
//! - `fit`: ingest a table, run the built-in engine, print a JSON report
//! - `check`: validate a priors file without fitting anything
//!
//! stdout carries payloads only; logs go to stderr.

use crate::adapt::build_engine_input;
use crate::engine::{fit_with_timeout, MetropolisEngine, SamplerConfig};
use crate::generate::{
    simulate_logistic, simulate_regression, simulate_var, stable_phi, Forcing, LogisticConfig,
    NoiseSpec, RegressionConfig,
};
use crate::ingest::{read_table_path, write_table, write_table_path};
use crate::logging::{LogFormat, LogLevel};
use crate::model::ModelSpec;
use crate::ode::OdeTolerances;
use crate::series::TimeSeries;
use crate::summary::{FitReport, SummaryOptions};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sf_common::{Error, OutputFormat, Result};
use sf_config::{load_priors_file, PresetName, PriorsFile};
use std::path::PathBuf;

/// seriesfit - Bayesian time-series fitting pipeline
#[derive(Parser, Debug)]
#[command(name = "seriesfit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Log verbosity
    #[arg(long, global = true, env = "SF_LOG")]
    pub log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, global = true, env = "SF_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Payload output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Disable colored error output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a synthetic series and write it as a table
    Simulate(SimulateArgs),

    /// Fit a model to a table of observations
    Fit(FitArgs),

    /// Validate a priors file
    Check(CheckArgs),
}

/// Generative process families for `simulate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SimKind {
    Regression,
    Var,
    Ode,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Generative process
    #[arg(long, value_enum)]
    pub kind: SimKind,

    /// Output path; stdout when omitted
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// RNG seed
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Series length (time points)
    #[arg(long, default_value_t = 200)]
    pub len: usize,

    /// Number of variables (var only)
    #[arg(long, default_value_t = 3)]
    pub dim: usize,

    /// Spectral radius of the generated transition matrix (var only)
    #[arg(long, default_value_t = 0.8)]
    pub radius: f64,

    /// Observation noise standard deviation
    #[arg(long, default_value_t = 1.0)]
    pub noise_sd: f64,

    /// True slope (regression only)
    #[arg(long, default_value_t = 1.5)]
    pub slope: f64,

    /// True intercept (regression only)
    #[arg(long, default_value_t = 2.0)]
    pub intercept: f64,

    /// Predictor scale (regression only)
    #[arg(long, default_value_t = 2.0)]
    pub x_scale: f64,

    /// Growth rate (ode only)
    #[arg(long, default_value_t = 0.8)]
    pub growth_rate: f64,

    /// Carrying capacity (ode only)
    #[arg(long, default_value_t = 10.0)]
    pub capacity: f64,

    /// Initial state (ode only)
    #[arg(long, default_value_t = 0.5)]
    pub initial: f64,

    /// Observation grid spacing (ode only)
    #[arg(long, default_value_t = 0.25)]
    pub dt: f64,

    /// Forcing period (ode only; enables the forcing term)
    #[arg(long)]
    pub forcing_period: Option<f64>,

    /// Forcing amplitude (ode only, with --forcing-period)
    #[arg(long, default_value_t = 1.0)]
    pub forcing_amplitude: f64,
}

/// Model families for `fit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FitKind {
    Regression,
    VarDiagonal,
    VarFullCov,
    VarConstrained,
    Ode,
}

#[derive(Args, Debug)]
pub struct FitArgs {
    /// Model family
    #[arg(long, value_enum)]
    pub kind: FitKind,

    /// Input table (rows = variables, columns = time points)
    #[arg(long)]
    pub input: PathBuf,

    /// Prior preset used when no priors file is given
    #[arg(long, default_value = "diffuse")]
    pub preset: String,

    /// Priors file overriding the preset
    #[arg(long)]
    pub priors: Option<PathBuf>,

    /// Constraint mask for var-constrained, rows separated by ';',
    /// e.g. "1,0,0;0,1,0;0,0,1" (1 = free, 0 = pinned)
    #[arg(long)]
    pub mask: Option<String>,

    /// Observation grid spacing (ode only)
    #[arg(long, default_value_t = 0.25)]
    pub dt: f64,

    /// Forcing period (ode only; adds the amplitude parameter)
    #[arg(long)]
    pub forcing_period: Option<f64>,

    /// Number of chains
    #[arg(long, default_value_t = 4)]
    pub chains: usize,

    /// Retained draws per chain
    #[arg(long, default_value_t = 1000)]
    pub iterations: usize,

    /// Warm-up iterations per chain
    #[arg(long, default_value_t = 1000)]
    pub warmup: usize,

    /// Sampler seed
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Abort the sampler after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Credible interval level
    #[arg(long, default_value_t = 0.95)]
    pub ci_level: f64,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Priors file to validate
    #[arg(long)]
    pub priors: PathBuf,
}

/// Run a parsed CLI invocation. Payloads go to stdout; the caller maps
/// errors to exit codes.
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Simulate(args) => run_simulate(args),
        Commands::Fit(args) => run_fit(args, cli.global.format),
        Commands::Check(args) => run_check(args),
    }
}

fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let series = match args.kind {
        SimKind::Regression => {
            let config = RegressionConfig {
                slope: args.slope,
                intercept: args.intercept,
                noise_sd: args.noise_sd,
                n: args.len,
                x_location: 0.0,
                x_scale: args.x_scale,
            };
            simulate_regression(&config, args.seed)?
        }
        SimKind::Var => {
            let phi = stable_phi(args.dim, args.radius, args.seed)?;
            let noise = NoiseSpec::Diagonal(vec![args.noise_sd; args.dim]);
            simulate_var(&phi, &noise, args.len, args.seed.wrapping_add(1))?
        }
        SimKind::Ode => {
            let times: Vec<f64> = (0..args.len).map(|i| i as f64 * args.dt).collect();
            let config = LogisticConfig {
                growth_rate: args.growth_rate,
                capacity: args.capacity,
                initial: args.initial,
                forcing: args.forcing_period.map(|period| Forcing {
                    amplitude: args.forcing_amplitude,
                    period,
                }),
                noise_sd: args.noise_sd,
                times,
                tolerances: OdeTolerances::default(),
            };
            simulate_logistic(&config, args.seed)?
        }
    };

    tracing::info!(
        kind = ?args.kind,
        len = series.len(),
        dim = series.dim(),
        seed = args.seed,
        "simulated series"
    );

    match &args.out {
        Some(path) => write_table_path(&series, path)?,
        None => write_table(&series, std::io::stdout().lock())?,
    }
    Ok(())
}

fn parse_mask(raw: &str) -> Result<Vec<Vec<bool>>> {
    raw.split(';')
        .map(|row| {
            row.split(',')
                .map(|cell| match cell.trim() {
                    "1" => Ok(true),
                    "0" => Ok(false),
                    other => Err(Error::Spec(format!(
                        "mask entries must be 0 or 1, got {other:?}"
                    ))),
                })
                .collect()
        })
        .collect()
}

fn load_priors(args: &FitArgs) -> Result<PriorsFile> {
    match &args.priors {
        Some(path) => load_priors_file(path)
            .map_err(|e| Error::Spec(format!("priors file {}: {e}", path.display()))),
        None => {
            let preset = PresetName::parse(&args.preset).ok_or_else(|| {
                Error::Spec(format!("unknown preset {:?}", args.preset))
            })?;
            Ok(PriorsFile::preset(preset))
        }
    }
}

fn build_spec(args: &FitArgs, series: &TimeSeries) -> Result<ModelSpec> {
    let priors = load_priors(args)?;
    let section = |name: &str| Error::Spec(format!("priors file lacks the {name} section"));

    Ok(match args.kind {
        FitKind::Regression => ModelSpec::LinearRegression {
            priors: priors.regression.ok_or_else(|| section("regression"))?,
        },
        FitKind::VarDiagonal => ModelSpec::VarDiagonal {
            dim: series.dim(),
            priors: priors.var.ok_or_else(|| section("var"))?,
        },
        FitKind::VarFullCov => ModelSpec::VarFullCov {
            dim: series.dim(),
            priors: priors.var.ok_or_else(|| section("var"))?,
        },
        FitKind::VarConstrained => {
            let raw = args.mask.as_deref().ok_or_else(|| {
                Error::Spec("var-constrained needs --mask".into())
            })?;
            ModelSpec::VarConstrained {
                dim: series.dim(),
                mask: parse_mask(raw)?,
                priors: priors.var.ok_or_else(|| section("var"))?,
            }
        }
        FitKind::Ode => ModelSpec::OdeLogistic {
            times: (0..series.len()).map(|i| i as f64 * args.dt).collect(),
            forcing_period: args.forcing_period,
            priors: priors.ode.ok_or_else(|| section("ode"))?,
        },
    })
}

fn run_fit(args: &FitArgs, format: OutputFormat) -> Result<()> {
    let series = read_table_path(&args.input)?;
    tracing::info!(
        input = %args.input.display(),
        len = series.len(),
        dim = series.dim(),
        "ingested series"
    );

    let spec = build_spec(args, &series)?;
    let input = build_engine_input(&spec, &series)?;

    let config = SamplerConfig {
        chains: args.chains,
        iterations: args.iterations,
        warmup: args.warmup,
        seed: args.seed,
        ode: OdeTolerances::default(),
        timeout_seconds: args.timeout_secs,
    };

    let set = fit_with_timeout(MetropolisEngine, input, config)?;
    let options = SummaryOptions {
        ci_level: args.ci_level,
        ..SummaryOptions::default()
    };
    let report = FitReport::build(spec.name(), &set, &options)?;

    tracing::info!(
        run_id = %report.run_id,
        model = %report.model,
        flags = report.flags.len(),
        "fit complete"
    );

    let payload = match format {
        OutputFormat::Json => serde_json::to_string(&report)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(&report)?,
        OutputFormat::Summary => report.summary_line(),
    };
    println!("{payload}");
    Ok(())
}

fn run_check(args: &CheckArgs) -> Result<()> {
    load_priors_file(&args.priors)
        .map_err(|e| Error::Spec(format!("priors file {}: {e}", args.priors.display())))?;
    println!("ok: {}", args.priors.display());
    Ok(())
}
