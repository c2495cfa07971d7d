//! Baseline Ratios
//!
//! A ratio below 1.0 means the candidate is faster than its group's baseline.
//! Targets are upper bounds on that ratio.

use serde::{Deserialize, Serialize};

/// Outcome of checking a ratio against a registered target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetVerdict {
    /// Ratio is at or below the target
    Met,
    /// Ratio exceeds the target
    Missed,
}

impl TargetVerdict {
    /// Whether the target was met
    pub fn is_met(self) -> bool {
        matches!(self, TargetVerdict::Met)
    }
}

/// Ratio of a candidate mean to its baseline mean.
///
/// Returns `None` when the baseline mean is zero, negative or not finite,
/// since no meaningful ratio exists then.
pub fn baseline_ratio(candidate_mean: f64, baseline_mean: f64) -> Option<f64> {
    if !baseline_mean.is_finite() || baseline_mean <= 0.0 || !candidate_mean.is_finite() {
        return None;
    }
    Some(candidate_mean / baseline_mean)
}

/// Compare a mean ratio against a target ratio
pub fn evaluate_target(ratio: f64, target: f64) -> TargetVerdict {
    if ratio <= target {
        TargetVerdict::Met
    } else {
        TargetVerdict::Missed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(baseline_ratio(50.0, 100.0), Some(0.5));
        assert_eq!(baseline_ratio(300.0, 100.0), Some(3.0));
    }

    #[test]
    fn test_identical_means_ratio_is_exactly_one() {
        let mean = 0.123_456_789;
        assert_eq!(baseline_ratio(mean, mean), Some(1.0));
    }

    #[test]
    fn test_degenerate_baseline() {
        assert_eq!(baseline_ratio(1.0, 0.0), None);
        assert_eq!(baseline_ratio(1.0, -2.0), None);
        assert_eq!(baseline_ratio(1.0, f64::NAN), None);
        assert_eq!(baseline_ratio(f64::INFINITY, 1.0), None);
    }

    #[test]
    fn test_target_verdict() {
        assert_eq!(evaluate_target(0.4, 0.5), TargetVerdict::Met);
        assert_eq!(evaluate_target(0.5, 0.5), TargetVerdict::Met);
        assert_eq!(evaluate_target(0.51, 0.5), TargetVerdict::Missed);
        assert!(!TargetVerdict::Missed.is_met());
    }
}
