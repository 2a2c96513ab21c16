//! series_fit Core Library
//!
//! Core functionality for the Bayesian time-series fitting pipeline:
//! - Validated time-series containers and tabular ingestion
//! - Synthetic data generators (regression, VAR, logistic ODE)
//! - Model specifications and the engine-input adapter
//! - Sampling engines behind an opaque trait, with a timeout wrapper
//! - Posterior summarization with convergence diagnostics
//!
//! The binary entry point is in `main.rs`.

pub mod adapt;
pub mod cli;
pub mod engine;
pub mod exit_codes;
pub mod generate;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod ode;
pub mod series;
pub mod summary;

// Re-export the mock engine for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub use engine::mock::MockEngine;
