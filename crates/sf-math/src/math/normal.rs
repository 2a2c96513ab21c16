//! Gaussian-family log densities used for likelihoods and priors.
//!
//! All functions propagate NaN inputs and return NaN for invalid
//! hyperparameters (non-positive scales), matching the conventions of the
//! rest of this crate: callers validate parameters up front and these
//! routines never panic.

use std::f64::consts::PI;

const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8; // 0.5 * ln(2*pi)

/// Log density of N(mean, sd^2) at x.
pub fn normal_log_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    if x.is_nan() || mean.is_nan() || sd.is_nan() {
        return f64::NAN;
    }
    if sd <= 0.0 {
        return f64::NAN;
    }
    let z = (x - mean) / sd;
    -LOG_SQRT_2PI - sd.ln() - 0.5 * z * z
}

/// Log density of a half-normal with scale `sd`, supported on [0, inf).
///
/// Twice the N(0, sd^2) density on the non-negative half line; -inf below
/// the support.
pub fn half_normal_log_pdf(x: f64, sd: f64) -> f64 {
    if x.is_nan() || sd.is_nan() {
        return f64::NAN;
    }
    if sd <= 0.0 {
        return f64::NAN;
    }
    if x < 0.0 {
        return f64::NEG_INFINITY;
    }
    2.0f64.ln() + normal_log_pdf(x, 0.0, sd)
}

/// Log density of Uniform(low, high) at x; -inf outside the support.
pub fn uniform_log_pdf(x: f64, low: f64, high: f64) -> f64 {
    if x.is_nan() || low.is_nan() || high.is_nan() {
        return f64::NAN;
    }
    if high <= low {
        return f64::NAN;
    }
    if x < low || x > high {
        return f64::NEG_INFINITY;
    }
    -(high - low).ln()
}

/// Density of the standard normal at z.
pub fn std_normal_pdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}
