//! series_fit shared types and errors.
//!
//! Foundational types used across the pipeline crates:
//! - Unified error taxonomy with stable codes and categories
//! - Structured JSON error rendering for machine consumers
//! - Output format specification for the CLI

pub mod error;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use output::OutputFormat;
