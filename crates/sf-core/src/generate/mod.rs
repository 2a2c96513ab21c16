//! Synthetic data generators.
//!
//! Each generator takes an explicit seed and returns a validated
//! [`TimeSeries`](crate::series::TimeSeries); there is no hidden RNG
//! state. Divergent or non-finite draws surface as numerical errors,
//! distinct from input validation failures.

pub mod ode;
pub mod regression;
pub mod var;

pub use ode::{simulate_logistic, Forcing, LogisticConfig};
pub use regression::{simulate_regression, RegressionConfig};
pub use var::{simulate_var, stable_phi, NoiseSpec};
