//! Numerically stable scalar transforms for log-domain Bayesian math.

/// Stable log(exp(a) + exp(b)).
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    if a == f64::INFINITY || b == f64::INFINITY {
        return f64::INFINITY;
    }
    let m = a.max(b);
    let diff = (a - b).abs();
    m + (-diff).exp().ln_1p()
}

/// Stable softplus: log(1 + exp(x)).
///
/// For large x the result is x itself; for very negative x it decays to
/// exp(x) without intermediate overflow.
pub fn softplus(x: f64) -> f64 {
    log_add_exp(x, 0.0)
}

/// Stable logistic function 1 / (1 + exp(-x)).
///
/// Evaluates through exp of a non-positive argument only, so neither tail
/// overflows. Saturates to exactly 0.0 / 1.0 in the far tails.
pub fn sigmoid(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x >= 0.0 {
        let e = (-x).exp();
        1.0 / (1.0 + e)
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn log_add_exp_basic() {
        let out = log_add_exp(0.0, 0.0);
        assert!(approx_eq(out, 2.0f64.ln(), 1e-12));
    }

    #[test]
    fn log_add_exp_dominance() {
        let out = log_add_exp(-1000.0, 0.0);
        assert!(approx_eq(out, 0.0, 1e-12));
    }

    #[test]
    fn log_add_exp_infinity_rules() {
        let out = log_add_exp(f64::INFINITY, 1.0);
        assert!(out.is_infinite() && out.is_sign_positive());

        let out2 = log_add_exp(f64::NEG_INFINITY, 2.0);
        assert!(approx_eq(out2, 2.0, 1e-12));
    }

    #[test]
    fn log_add_exp_nan_propagates() {
        assert!(log_add_exp(f64::NAN, 0.0).is_nan());
    }

    #[test]
    fn softplus_tails() {
        // Large positive: softplus(x) ~ x.
        assert!(approx_eq(softplus(800.0), 800.0, 1e-9));
        // Large negative: softplus(x) ~ exp(x), effectively 0.
        assert!(softplus(-800.0).abs() < 1e-300);
        // At zero: ln(2).
        assert!(approx_eq(softplus(0.0), 2.0f64.ln(), 1e-12));
    }

    #[test]
    fn sigmoid_symmetry_and_saturation() {
        assert!(approx_eq(sigmoid(0.0), 0.5, 1e-15));
        let x = 1.7;
        assert!(approx_eq(sigmoid(x) + sigmoid(-x), 1.0, 1e-12));
        assert!(approx_eq(sigmoid(800.0), 1.0, 0.0));
        assert!(approx_eq(sigmoid(-800.0), 0.0, 0.0));
    }

    #[test]
    fn sigmoid_nan_propagates() {
        assert!(sigmoid(f64::NAN).is_nan());
    }
}
