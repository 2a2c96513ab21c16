//! Adaptive fourth-order Runge-Kutta integration.
//!
//! Step-doubling RK4 with Richardson error control, shared by the
//! synthetic ODE generator and the ODE-constrained likelihood. The
//! integrator is deliberately scalar: the bundled growth models have
//! one-dimensional state.
//!
//! # Algorithm
//!
//! For each interval between requested output times, advance with trial
//! steps of size `h`: one full RK4 step is compared against two half
//! steps; their difference over 15 estimates the local error (RK4 local
//! error is O(h^5)). Accepted steps use the locally extrapolated value.
//! The step size is rescaled by the usual fifth-root rule, clamped so a
//! single bad estimate cannot freeze or explode the integration.

use serde::{Deserialize, Serialize};

/// Error-control settings for the embedded ODE integration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OdeTolerances {
    /// Relative tolerance on the local step error.
    pub rel_tol: f64,
    /// Absolute tolerance on the local step error.
    pub abs_tol: f64,
    /// Budget of internal step attempts across the whole grid.
    pub max_steps: usize,
}

impl Default for OdeTolerances {
    fn default() -> Self {
        Self {
            rel_tol: 1e-6,
            abs_tol: 1e-8,
            max_steps: 100_000,
        }
    }
}

/// Why an integration stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdeFailure {
    /// The step budget ran out before the grid was covered.
    StepBudget { max_steps: usize },
    /// The state left the finite range.
    NonFinite,
}

/// One classical RK4 step of size h from (t, x).
fn rk4_step<F: Fn(f64, f64) -> f64>(f: &F, t: f64, x: f64, h: f64) -> f64 {
    let k1 = f(t, x);
    let k2 = f(t + 0.5 * h, x + 0.5 * h * k1);
    let k3 = f(t + 0.5 * h, x + 0.5 * h * k2);
    let k4 = f(t + h, x + h * k3);
    x + h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4)
}

/// Integrate dx/dt = f(t, x) from `times[0]`, returning the state at
/// every requested time (including the first, which is `x0` itself).
///
/// `times` must be strictly increasing; callers validate this before
/// reaching the integrator.
pub fn integrate<F: Fn(f64, f64) -> f64>(
    f: F,
    x0: f64,
    times: &[f64],
    tol: &OdeTolerances,
) -> Result<Vec<f64>, OdeFailure> {
    let mut out = Vec::with_capacity(times.len());
    out.push(x0);

    let mut x = x0;
    let mut steps = 0usize;
    // Initial trial step: a fraction of the first interval.
    let mut h = if times.len() > 1 {
        (times[1] - times[0]) / 16.0
    } else {
        return Ok(out);
    };

    for w in times.windows(2) {
        let (start, end) = (w[0], w[1]);
        let mut t = start;

        while t < end {
            if steps >= tol.max_steps {
                return Err(OdeFailure::StepBudget {
                    max_steps: tol.max_steps,
                });
            }
            steps += 1;

            let step = h.min(end - t);

            let full = rk4_step(&f, t, x, step);
            let half = rk4_step(&f, t, x, 0.5 * step);
            let two_halves = rk4_step(&f, t + 0.5 * step, half, 0.5 * step);

            if !two_halves.is_finite() || !full.is_finite() {
                return Err(OdeFailure::NonFinite);
            }

            let err = (two_halves - full).abs() / 15.0;
            let scale = tol.abs_tol + tol.rel_tol * two_halves.abs();

            if err <= scale {
                // Accept, with local extrapolation.
                x = two_halves + (two_halves - full) / 15.0;
                if !x.is_finite() {
                    return Err(OdeFailure::NonFinite);
                }
                t += step;
            }

            // Fifth-root step rescale, clamped to [0.2, 5.0] per attempt.
            let factor = if err > 0.0 {
                (0.9 * (scale / err).powf(0.2)).clamp(0.2, 5.0)
            } else {
                5.0
            };
            h = (step * factor).max(f64::MIN_POSITIVE);
        }

        out.push(x);
    }

    Ok(out)
}
