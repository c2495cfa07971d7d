//! Summary Statistics
//!
//! Every sample contributes one per-iteration value, so the mean weights
//! samples equally regardless of how many iterations each one ran.
//! Minimum approximates the noise-free cost; mean reflects the variance a
//! real caller is exposed to. Both are always reported.

use crate::MICROS_PER_SECOND;
use crate::percentiles::{Quantiles, compute_quantiles};
use serde::{Deserialize, Serialize};

/// Summary of per-iteration times (microseconds) for one benchmark
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Fastest per-iteration time
    pub min: f64,
    /// Slowest per-iteration time
    pub max: f64,
    /// Arithmetic mean across samples
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std_dev: f64,
    /// Quantiles over all samples
    pub quantiles: Quantiles,
    /// Number of samples summarised
    pub sample_count: usize,
}

/// Compute summary statistics from per-iteration microsecond values.
///
/// An empty slice yields an all-zero summary with `sample_count == 0`.
pub fn compute_summary(per_iteration_us: &[f64]) -> SummaryStatistics {
    if per_iteration_us.is_empty() {
        return SummaryStatistics::default();
    }

    let n = per_iteration_us.len();
    let mean = per_iteration_us.iter().sum::<f64>() / n as f64;

    let std_dev = if n < 2 {
        0.0
    } else {
        let ss: f64 = per_iteration_us.iter().map(|x| (x - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    };

    let (min, max) = per_iteration_us
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });

    SummaryStatistics {
        min,
        max,
        mean,
        std_dev,
        quantiles: compute_quantiles(per_iteration_us),
        sample_count: n,
    }
}

impl SummaryStatistics {
    /// Median per-iteration time
    pub fn median(&self) -> f64 {
        self.quantiles.p50
    }

    /// Coefficient of variation as a percentage of the mean
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            (self.std_dev / self.mean) * 100.0
        }
    }

    /// Standard error of the mean divided by the mean (a fraction, not a percentage)
    pub fn relative_standard_error(&self) -> f64 {
        if self.mean == 0.0 || self.sample_count == 0 {
            0.0
        } else {
            self.std_dev / (self.sample_count as f64).sqrt() / self.mean
        }
    }

    /// Iterations per second implied by the mean.
    ///
    /// `None` when the mean is zero (the body was below clock resolution).
    pub fn ops_per_second(&self) -> Option<f64> {
        (self.mean > 0.0).then(|| MICROS_PER_SECOND / self.mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_summary() {
        let samples = vec![2.0, 4.0, 6.0, 8.0];
        let s = compute_summary(&samples);

        assert!((s.mean - 5.0).abs() < 1e-12);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 8.0);
        assert!((s.median() - 5.0).abs() < 1e-12);
        assert_eq!(s.sample_count, 4);
        // sqrt(20 / 3)
        assert!((s.std_dev - 2.581_988_897).abs() < 1e-6);
    }

    #[test]
    fn test_min_never_exceeds_mean() {
        let samples = vec![10.0, 10.5, 9.75, 30.0, 11.0];
        let s = compute_summary(&samples);
        assert!(s.min <= s.mean);
        assert!(s.mean <= s.max);
    }

    #[test]
    fn test_slow_samples_are_not_trimmed() {
        let samples = vec![1.0, 1.0, 1.0, 1.0, 96.0];
        let s = compute_summary(&samples);
        assert!((s.mean - 20.0).abs() < 1e-12);
        assert_eq!(s.max, 96.0);
    }

    #[test]
    fn test_ops_per_second() {
        let s = compute_summary(&[250.0, 250.0]);
        let ops = s.ops_per_second().unwrap();
        assert!((ops - 4_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_ops_per_second_guards_zero_mean() {
        let s = compute_summary(&[0.0, 0.0, 0.0]);
        assert_eq!(s.ops_per_second(), None);
        assert_eq!(s.coefficient_of_variation(), 0.0);
        assert_eq!(s.relative_standard_error(), 0.0);
    }

    #[test]
    fn test_single_sample_has_no_spread() {
        let s = compute_summary(&[3.5]);
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.min, 3.5);
        assert_eq!(s.max, 3.5);
    }

    #[test]
    fn test_empty_samples() {
        let s = compute_summary(&[]);
        assert_eq!(s.sample_count, 0);
        assert_eq!(s.mean, 0.0);
        assert_eq!(s.ops_per_second(), None);
    }

    #[test]
    fn test_relative_standard_error() {
        let samples = vec![9.0, 11.0, 9.0, 11.0];
        let s = compute_summary(&samples);
        // std_dev = sqrt(4/3), n = 4, mean = 10
        let expected = (4.0f64 / 3.0).sqrt() / 2.0 / 10.0;
        assert!((s.relative_standard_error() - expected).abs() < 1e-12);
    }
}
