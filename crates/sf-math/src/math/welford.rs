//! Welford running moments.
//!
//! Single-pass, numerically stable mean/variance accumulation used when
//! summarizing long chains without materializing intermediate sums.

use serde::{Deserialize, Serialize};

/// Streaming mean/variance accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningMoments {
    count: u64,
    mean: f64,
    m2: f64,
}

/// Finalized moments, serializable into fit reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    pub count: u64,
    pub mean: f64,
    /// Sample variance (n-1 denominator); NaN when count < 2.
    pub variance: f64,
}

impl RunningMoments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate one observation.
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Running mean; NaN when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }

    /// Sample variance (n-1 denominator); NaN when count < 2.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            f64::NAN
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Sample standard deviation; NaN when count < 2.
    pub fn sd(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn finish(&self) -> Moments {
        Moments {
            count: self.count,
            mean: self.mean(),
            variance: self.variance(),
        }
    }
}
