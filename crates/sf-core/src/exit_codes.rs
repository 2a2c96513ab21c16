//! Exit codes for the seriesfit CLI.
//!
//! Exit codes communicate outcome without output parsing and are a
//! stable contract for automation.

use sf_common::{Error, ErrorCategory};

/// Exit codes for seriesfit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Clean run.
    Success = 0,

    /// Runtime failure (sampler, numerics, I/O).
    RuntimeError = 1,

    /// Input failed validation before any work was attempted.
    ValidationError = 2,
}

impl ExitCode {
    /// Map an error to its exit code.
    pub fn from_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Validation => ExitCode::ValidationError,
            ErrorCategory::Numerical | ErrorCategory::Sampler | ErrorCategory::Io => {
                ExitCode::RuntimeError
            }
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}
