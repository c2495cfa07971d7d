//! Adaptive Stopping Rule
//!
//! Used when a benchmark registers with zero samples. Sampling continues until
//! the relative standard error of the mean drops to `target_rse` (after at
//! least `min_samples`), or until `max_samples` is reached. Time limits are
//! enforced by the runner, which owns the clock.

use crate::running::RunningStats;
use crate::{DEFAULT_MAX_SAMPLES, DEFAULT_MIN_SAMPLES, DEFAULT_TARGET_RSE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid stopping rule parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoppingRuleError {
    /// `min_samples` must be at least 2 so a variance exists
    #[error("min_samples must be at least 2, got {0}")]
    MinSamplesTooSmall(usize),
    /// `max_samples` below `min_samples`
    #[error("max_samples ({max}) is smaller than min_samples ({min})")]
    MaxBelowMin {
        /// Configured minimum
        min: usize,
        /// Configured maximum
        max: usize,
    },
    /// Target must be a positive finite fraction
    #[error("target_rse must be positive and finite, got {0}")]
    InvalidTarget(f64),
}

/// What the runner should do after the latest sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    /// Keep sampling
    Continue,
    /// Precision target reached
    Converged,
    /// Hard sample cap reached
    SampleLimit,
}

/// Relative-standard-error stopping rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingRule {
    /// Samples always collected before convergence is checked
    pub min_samples: usize,
    /// Upper bound on samples
    pub max_samples: usize,
    /// Target standard error of the mean, as a fraction of the mean
    pub target_rse: f64,
}

impl Default for StoppingRule {
    fn default() -> Self {
        Self {
            min_samples: DEFAULT_MIN_SAMPLES,
            max_samples: DEFAULT_MAX_SAMPLES,
            target_rse: DEFAULT_TARGET_RSE,
        }
    }
}

impl StoppingRule {
    /// Build a validated rule
    pub fn new(
        min_samples: usize,
        max_samples: usize,
        target_rse: f64,
    ) -> Result<Self, StoppingRuleError> {
        let rule = Self {
            min_samples,
            max_samples,
            target_rse,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Check parameters
    pub fn validate(&self) -> Result<(), StoppingRuleError> {
        if self.min_samples < 2 {
            return Err(StoppingRuleError::MinSamplesTooSmall(self.min_samples));
        }
        if self.max_samples < self.min_samples {
            return Err(StoppingRuleError::MaxBelowMin {
                min: self.min_samples,
                max: self.max_samples,
            });
        }
        if !self.target_rse.is_finite() || self.target_rse <= 0.0 {
            return Err(StoppingRuleError::InvalidTarget(self.target_rse));
        }
        Ok(())
    }

    /// Decide whether to keep sampling given everything seen so far.
    ///
    /// A zero mean (body below clock resolution) counts as converged once
    /// `min_samples` is reached; more samples cannot add precision.
    pub fn decide(&self, stats: &RunningStats) -> StopDecision {
        let n = stats.count();
        if n >= self.max_samples {
            return StopDecision::SampleLimit;
        }
        if n < self.min_samples {
            return StopDecision::Continue;
        }
        match stats.relative_standard_error() {
            Some(rse) if rse <= self.target_rse => StopDecision::Converged,
            None => StopDecision::Converged,
            Some(_) => StopDecision::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(values: impl IntoIterator<Item = f64>) -> RunningStats {
        let mut rs = RunningStats::new();
        for v in values {
            rs.push(v);
        }
        rs
    }

    #[test]
    fn test_waits_for_min_samples() {
        let rule = StoppingRule::default();
        let stats = feed(std::iter::repeat(5.0).take(rule.min_samples - 1));
        assert_eq!(rule.decide(&stats), StopDecision::Continue);
    }

    #[test]
    fn test_converges_on_stable_values() {
        let rule = StoppingRule::default();
        let stats = feed((0..rule.min_samples).map(|i| 100.0 + (i % 2) as f64 * 0.1));
        assert_eq!(rule.decide(&stats), StopDecision::Converged);
    }

    #[test]
    fn test_noisy_values_continue() {
        let rule = StoppingRule::default();
        let stats = feed((0..rule.min_samples).map(|i| if i % 2 == 0 { 1.0 } else { 50.0 }));
        assert_eq!(rule.decide(&stats), StopDecision::Continue);
    }

    #[test]
    fn test_sample_limit() {
        let rule = StoppingRule::new(2, 4, 1e-9).unwrap();
        let stats = feed([1.0, 9.0, 1.0, 9.0]);
        assert_eq!(rule.decide(&stats), StopDecision::SampleLimit);
    }

    #[test]
    fn test_zero_mean_converges() {
        let rule = StoppingRule::default();
        let stats = feed(std::iter::repeat(0.0).take(rule.min_samples));
        assert_eq!(rule.decide(&stats), StopDecision::Converged);
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            StoppingRule::new(1, 10, 0.01),
            Err(StoppingRuleError::MinSamplesTooSmall(1))
        );
        assert_eq!(
            StoppingRule::new(10, 5, 0.01),
            Err(StoppingRuleError::MaxBelowMin { min: 10, max: 5 })
        );
        assert!(matches!(
            StoppingRule::new(10, 50, 0.0),
            Err(StoppingRuleError::InvalidTarget(_))
        ));
    }
}
