//! Convergence diagnostics over chain-grouped draws.
//!
//! Split potential-scale-reduction (split-Rhat) and effective sample
//! size via Geyer's initial-monotone-sequence estimator. Both operate on
//! raw per-chain draw vectors and are engine-agnostic.

/// Sample mean.
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with n-1 denominator.
fn sample_var(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Split potential-scale-reduction statistic.
///
/// Each chain is split in half (the middle draw of an odd-length chain
/// is dropped), then between- and within-chain variances are compared.
/// Values near 1 indicate the chains agree; NaN means the diagnostic is
/// undefined (too few draws, or zero within-chain variance).
pub fn split_rhat(chains: &[Vec<f64>]) -> f64 {
    let halves: Vec<&[f64]> = chains
        .iter()
        .flat_map(|c| {
            let h = c.len() / 2;
            [&c[..h], &c[c.len() - h..]]
        })
        .collect();

    let m = halves.len();
    let n = halves.iter().map(|h| h.len()).min().unwrap_or(0);
    if m < 2 || n < 2 {
        return f64::NAN;
    }

    let means: Vec<f64> = halves.iter().map(|h| mean(h)).collect();
    let within = mean(
        &halves
            .iter()
            .zip(&means)
            .map(|(h, m)| sample_var(h, *m))
            .collect::<Vec<f64>>(),
    );
    if !(within > 0.0) {
        return f64::NAN;
    }

    let grand = mean(&means);
    let between =
        n as f64 / (m - 1) as f64 * means.iter().map(|m| (m - grand).powi(2)).sum::<f64>();

    let var_plus = (n - 1) as f64 / n as f64 * within + between / n as f64;
    (var_plus / within).sqrt()
}

/// Effective sample size pooled across chains.
///
/// Autocorrelations are combined across chains, summed over Geyer's
/// initial positive monotone pairs. The estimate is capped at the total
/// draw count; NaN means the diagnostic is undefined.
pub fn ess(chains: &[Vec<f64>]) -> f64 {
    let m = chains.len();
    let n = chains.iter().map(|c| c.len()).min().unwrap_or(0);
    if m == 0 || n < 4 {
        return f64::NAN;
    }
    let total = (m * n) as f64;

    let chains: Vec<&[f64]> = chains.iter().map(|c| &c[..n]).collect();
    let means: Vec<f64> = chains.iter().map(|c| mean(c)).collect();
    let vars: Vec<f64> = chains
        .iter()
        .zip(&means)
        .map(|(c, m)| sample_var(c, *m))
        .collect();

    let within = mean(&vars);
    if !(within > 0.0) {
        return f64::NAN;
    }
    let var_plus = if m > 1 {
        let grand = mean(&means);
        let between =
            n as f64 / (m - 1) as f64 * means.iter().map(|x| (x - grand).powi(2)).sum::<f64>();
        (n - 1) as f64 / n as f64 * within + between / n as f64
    } else {
        (n - 1) as f64 / n as f64 * within
    };
    if !(var_plus > 0.0) {
        return f64::NAN;
    }

    // Mean autocovariance across chains at one lag.
    let acov = |lag: usize| -> f64 {
        let per_chain: f64 = chains
            .iter()
            .zip(&means)
            .map(|(c, mu)| {
                (0..n - lag).map(|i| (c[i] - mu) * (c[i + lag] - mu)).sum::<f64>() / n as f64
            })
            .sum();
        per_chain / m as f64
    };
    let rho = |lag: usize| -> f64 { 1.0 - (within - acov(lag)) / var_plus };

    let mut pair_sum = 0.0;
    let mut prev_pair = f64::INFINITY;
    let mut lag = 0;
    while lag + 1 < n {
        let pair = rho(lag) + rho(lag + 1);
        if pair <= 0.0 {
            break;
        }
        // Enforce monotone decrease to tame noisy tails.
        let pair = pair.min(prev_pair);
        prev_pair = pair;
        pair_sum += pair;
        lag += 2;
    }

    let tau = 2.0 * pair_sum - 1.0;
    if tau <= 0.0 {
        return total;
    }
    (total / tau).min(total)
}
