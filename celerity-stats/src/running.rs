//! Streaming mean/variance (Welford) for adaptive sampling.

/// Incremental accumulator for per-iteration times
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    /// Empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Number of observations
    pub fn count(&self) -> usize {
        self.count
    }

    /// Running mean (0.0 when empty)
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance (n - 1); 0.0 with fewer than two observations
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard error of the mean relative to the mean.
    ///
    /// `None` until two observations exist or while the mean is zero.
    pub fn relative_standard_error(&self) -> Option<f64> {
        if self.count < 2 || self.mean == 0.0 {
            return None;
        }
        Some(self.variance().sqrt() / (self.count as f64).sqrt() / self.mean.abs())
    }
}
