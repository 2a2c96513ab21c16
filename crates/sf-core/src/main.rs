//! seriesfit - Bayesian time-series fitting pipeline
//!
//! Entry point wiring: parse the CLI, initialize logging, dispatch, and
//! map errors to stable exit codes. Human-readable errors go to stderr;
//! structured payloads to stdout.

use clap::Parser;
use sf_common::format_error_human;
use sf_core::cli::{run, Cli};
use sf_core::exit_codes::ExitCode;
use sf_core::logging::{init_logging, LogConfig};
use std::io::IsTerminal;

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    match run(&cli) {
        Ok(()) => std::process::exit(ExitCode::Success.code()),
        Err(err) => {
            let use_color = !cli.global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(&err, use_color));
            std::process::exit(ExitCode::from_error(&err).code());
        }
    }
}
