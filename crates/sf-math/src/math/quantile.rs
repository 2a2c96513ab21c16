//! Empirical quantiles and credible intervals over posterior draws.

/// Linearly interpolated empirical quantile (R type-7).
///
/// `q` must lie in [0, 1]. Returns NaN for empty input, out-of-range `q`,
/// or any NaN in the data.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() || q.is_nan() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("NaN filtered above"));

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Central credible interval at the given level (e.g. 0.95).
///
/// Returns `(lower, upper)` from the `(1-level)/2` and `1-(1-level)/2`
/// empirical quantiles; `(NaN, NaN)` for invalid level or empty input.
pub fn credible_interval(values: &[f64], level: f64) -> (f64, f64) {
    if values.is_empty() || level.is_nan() || level <= 0.0 || level >= 1.0 {
        return (f64::NAN, f64::NAN);
    }
    let tail = (1.0 - level) / 2.0;
    (quantile(values, tail), quantile(values, 1.0 - tail))
}
