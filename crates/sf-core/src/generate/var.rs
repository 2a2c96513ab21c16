//! Vector autoregressive data generator.
//!
//! Simulates `state[t] = Phi * state[t-1] + noise[t]` with noise drawn
//! fresh each step from a diagonal or full-covariance Gaussian.
//!
//! Stability of `Phi` is NOT enforced here: the caller owns that
//! invariant (see [`stable_phi`] for a constructor that guarantees it).
//! An unstable matrix is legal input; if the trajectory leaves the
//! finite range the generator fails with a divergence error rather than
//! returning garbage.

use crate::series::TimeSeries;
use nalgebra::{Cholesky, DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use sf_common::{Error, Result};

/// Step-noise specification for the VAR generator.
#[derive(Debug, Clone)]
pub enum NoiseSpec {
    /// Independent per-variable Gaussian noise with the given standard
    /// deviations.
    Diagonal(Vec<f64>),
    /// Correlated Gaussian noise with a dense positive-definite
    /// covariance matrix.
    Covariance(DMatrix<f64>),
}

impl NoiseSpec {
    fn dim(&self) -> usize {
        match self {
            NoiseSpec::Diagonal(sds) => sds.len(),
            NoiseSpec::Covariance(cov) => cov.nrows(),
        }
    }
}

/// Largest eigenvalue magnitude of a square matrix.
pub fn spectral_radius(m: &DMatrix<f64>) -> f64 {
    m.complex_eigenvalues()
        .iter()
        .map(|e| e.norm())
        .fold(0.0, f64::max)
}

/// Build a random transition matrix with the requested spectral radius.
///
/// Draws i.i.d. standard-normal entries and rescales them so every
/// eigenvalue lands inside (for radius < 1) the unit circle. This is the
/// construction callers should use when they need a stable process.
pub fn stable_phi(dim: usize, radius: f64, seed: u64) -> Result<DMatrix<f64>> {
    if dim == 0 {
        return Err(Error::Spec("transition matrix dimension must be >= 1".into()));
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(Error::Spec(format!(
            "target spectral radius must be positive and finite, got {radius}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    loop {
        let raw = DMatrix::from_fn(dim, dim, |_, _| rng.sample::<f64, _>(StandardNormal));
        let rho = spectral_radius(&raw);
        // A zero spectral radius (nilpotent draw) cannot be rescaled;
        // resample instead.
        if rho > 1e-12 {
            return Ok(raw * (radius / rho));
        }
    }
}

/// Simulate a VAR(1) process of the given length, starting at the origin.
pub fn simulate_var(
    phi: &DMatrix<f64>,
    noise: &NoiseSpec,
    len: usize,
    seed: u64,
) -> Result<TimeSeries> {
    let dim = phi.nrows();
    if phi.ncols() != dim || dim == 0 {
        return Err(Error::Spec(format!(
            "transition matrix must be square and non-empty, got {}x{}",
            phi.nrows(),
            phi.ncols()
        )));
    }
    if noise.dim() != dim {
        return Err(Error::DimensionMismatch {
            declared: dim,
            actual: noise.dim(),
        });
    }
    if len < 2 {
        return Err(Error::SeriesTooShort { length: len, min: 2 });
    }

    // Pre-validate the noise spec and fix the sampling form.
    enum Sampler {
        Diagonal(Vec<f64>),
        Factor(DMatrix<f64>),
    }
    let sampler = match noise {
        NoiseSpec::Diagonal(sds) => {
            if let Some(sd) = sds.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
                return Err(Error::Spec(format!(
                    "noise standard deviations must be positive and finite, got {sd}"
                )));
            }
            Sampler::Diagonal(sds.clone())
        }
        NoiseSpec::Covariance(cov) => {
            if cov.nrows() != cov.ncols() {
                return Err(Error::Spec("noise covariance must be square".into()));
            }
            let chol = Cholesky::new(cov.clone()).ok_or_else(|| {
                Error::Spec("noise covariance is not positive definite".into())
            })?;
            Sampler::Factor(chol.l())
        }
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let mut draw_noise = |rng: &mut StdRng| -> DVector<f64> {
        let z = DVector::from_fn(dim, |_, _| rng.sample::<f64, _>(StandardNormal));
        match &sampler {
            Sampler::Diagonal(sds) => {
                DVector::from_iterator(dim, z.iter().zip(sds).map(|(z, sd)| z * sd))
            }
            Sampler::Factor(l) => l * z,
        }
    };

    let mut state = draw_noise(&mut rng);
    let mut points = Vec::with_capacity(len);
    points.push(state.iter().cloned().collect::<Vec<f64>>());

    for step in 1..len {
        state = phi * &state + draw_noise(&mut rng);
        if state.iter().any(|v| !v.is_finite()) {
            return Err(Error::DivergentSeries { step });
        }
        points.push(state.iter().cloned().collect::<Vec<f64>>());
    }

    TimeSeries::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn stable_phi_hits_requested_radius() {
        for seed in 0..5u64 {
            let phi = stable_phi(3, 0.8, seed).unwrap();
            let rho = spectral_radius(&phi);
            assert!((rho - 0.8).abs() < 1e-8, "seed {seed}: radius {rho}");
        }
    }

    #[test]
    fn simulate_is_deterministic_per_seed() {
        let phi = stable_phi(3, 0.7, 42).unwrap();
        let noise = NoiseSpec::Diagonal(vec![0.5, 0.5, 0.5]);
        let a = simulate_var(&phi, &noise, 50, 9).unwrap();
        let b = simulate_var(&phi, &noise, 50, 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn correlated_noise_requires_positive_definite_covariance() {
        let phi = stable_phi(2, 0.5, 0).unwrap();
        // Rank-deficient covariance
        let cov = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let err = simulate_var(&phi, &NoiseSpec::Covariance(cov), 10, 0).unwrap_err();
        assert!(matches!(err, Error::Spec(_)));

        let good = DMatrix::from_row_slice(2, 2, &[1.0, 0.3, 0.3, 1.0]);
        simulate_var(&phi, &NoiseSpec::Covariance(good), 10, 0).unwrap();
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let phi = stable_phi(3, 0.5, 0).unwrap();
        let err = simulate_var(&phi, &NoiseSpec::Diagonal(vec![1.0, 1.0]), 10, 0).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { declared: 3, actual: 2 }));
    }

    proptest! {
        // All stable transition matrices and noise scales keep the
        // trajectory finite for at least 1000 steps.
        #![proptest_config(ProptestConfig::with_cases(16))]
        #[test]
        fn stable_process_stays_finite_for_1000_steps(
            seed in 0u64..1_000,
            radius in 0.05f64..0.95,
            noise_sd in 0.01f64..10.0,
            dim in 1usize..4,
        ) {
            let phi = stable_phi(dim, radius, seed).unwrap();
            let noise = NoiseSpec::Diagonal(vec![noise_sd; dim]);
            let series = simulate_var(&phi, &noise, 1000, seed.wrapping_add(1)).unwrap();
            prop_assert_eq!(series.len(), 1000);
            // TimeSeries construction re-checks finiteness; reaching here
            // means every value was finite.
        }
    }
}
