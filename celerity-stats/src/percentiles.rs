//! Quantile Computation
//!
//! Quantiles are always taken over the full sample set. Slow samples are part
//! of what a benchmark exposes, so nothing is trimmed before ranking.

use serde::{Deserialize, Serialize};

/// Quantiles reported next to the summary
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quantiles {
    /// 25th percentile
    pub p25: f64,
    /// 50th percentile (median)
    pub p50: f64,
    /// 75th percentile
    pub p75: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
}

fn sorted_copy(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Linear interpolation between closest ranks on an already sorted slice.
fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (percentile.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = rank - lo as f64;
            sorted[lo] + frac * (sorted[hi] - sorted[lo])
        }
    }
}

/// Compute a single percentile (0-100) from unsorted samples.
///
/// Returns 0.0 for an empty slice.
///
/// ```
/// # use celerity_stats::compute_percentile;
/// let samples = [4.0, 1.0, 3.0, 2.0, 5.0];
/// assert_eq!(compute_percentile(&samples, 50.0), 3.0);
/// ```
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    percentile_of_sorted(&sorted_copy(samples), percentile)
}

/// Compute all reported quantiles with a single sort.
pub fn compute_quantiles(samples: &[f64]) -> Quantiles {
    let sorted = sorted_copy(samples);
    Quantiles {
        p25: percentile_of_sorted(&sorted, 25.0),
        p50: percentile_of_sorted(&sorted, 50.0),
        p75: percentile_of_sorted(&sorted, 75.0),
        p95: percentile_of_sorted(&sorted, 95.0),
        p99: percentile_of_sorted(&sorted, 99.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_of_odd_count() {
        let samples = vec![5.0, 1.0, 4.0, 2.0, 3.0];
        assert!((compute_percentile(&samples, 50.0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_median_interpolates_even_count() {
        let samples = vec![1.0, 2.0, 3.0, 4.0];
        assert!((compute_percentile(&samples, 50.0) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quantiles_are_ordered() {
        let samples: Vec<f64> = (1..=200).rev().map(|x| x as f64).collect();
        let q = compute_quantiles(&samples);

        assert!(q.p25 <= q.p50);
        assert!(q.p50 <= q.p75);
        assert!(q.p75 <= q.p95);
        assert!(q.p95 <= q.p99);
        assert!(q.p99 < 200.0);
    }

    #[test]
    fn test_out_of_range_percentile_is_clamped() {
        let samples = vec![1.0, 2.0, 3.0];
        assert_eq!(compute_percentile(&samples, 150.0), 3.0);
        assert_eq!(compute_percentile(&samples, -10.0), 1.0);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(compute_percentile(&[], 99.0), 0.0);
        assert_eq!(compute_percentile(&[7.5], 10.0), 7.5);
        assert_eq!(compute_quantiles(&[]), Quantiles::default());
    }
}
