//! Sample Aggregation
//!
//! Converts raw [`SampleMeasurement`]s into per-iteration microseconds and
//! summarises them into an [`AggregateResult`]. Measurements are consumed as
//! they arrive; only the per-iteration values survive until `finish`.

use crate::clock::{Ticks, TickSource};
use celerity_stats::{
    RunningStats, SummaryStatistics, TargetVerdict, baseline_ratio, compute_summary,
    evaluate_target,
};
use serde::{Deserialize, Serialize};

/// One timed sample: elapsed ticks for a batch of iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleMeasurement {
    /// Ticks between the readings around the body loop
    pub elapsed: Ticks,
    /// Iterations executed inside the timed region
    pub iterations: u64,
}

impl SampleMeasurement {
    /// Time per iteration in microseconds; `None` for a zero-iteration sample
    pub fn per_iteration_micros<C: TickSource + ?Sized>(&self, clock: &C) -> Option<f64> {
        (self.iterations > 0).then(|| clock.ticks_to_micros(self.elapsed) / self.iterations as f64)
    }
}

/// Statistical summary for one descriptor's complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Per-iteration statistics in microseconds
    pub summary: SummaryStatistics,
    /// Samples that contributed to the summary
    pub total_samples: u64,
    /// Iterations executed across contributing samples
    pub total_iterations: u64,
    /// Samples thrown away (clock anomalies or skipped failures)
    pub discarded_samples: u64,
    /// Mean relative to the group baseline; `None` when not applicable
    pub baseline_ratio: Option<f64>,
    /// Registered target ratio, if any
    pub target: Option<f64>,
    /// Target check against `baseline_ratio`
    pub target_verdict: Option<TargetVerdict>,
}

impl AggregateResult {
    /// Fastest per-iteration time (µs)
    pub fn min_us(&self) -> f64 {
        self.summary.min
    }

    /// Mean per-iteration time (µs)
    pub fn mean_us(&self) -> f64 {
        self.summary.mean
    }

    /// Iterations per second derived from the mean
    pub fn ops_per_second(&self) -> Option<f64> {
        self.summary.ops_per_second()
    }

    /// Record this result as its group's baseline: ratio exactly 1.0
    pub fn mark_as_baseline(&mut self) {
        self.baseline_ratio = Some(1.0);
        self.target_verdict = None;
    }

    /// Compute the ratio against the baseline mean and check the target
    pub fn compare_to_baseline(&mut self, baseline_mean_us: f64) {
        self.baseline_ratio = baseline_ratio(self.summary.mean, baseline_mean_us);
        self.target_verdict = match (self.baseline_ratio, self.target) {
            (Some(ratio), Some(target)) => Some(evaluate_target(ratio, target)),
            _ => None,
        };
    }

    /// True when a target exists and was missed
    pub fn missed_target(&self) -> bool {
        self.target_verdict.is_some_and(|v| !v.is_met())
    }
}

/// Accumulates samples for one descriptor
pub struct Aggregator<'c, C: ?Sized> {
    clock: &'c C,
    per_iteration_us: Vec<f64>,
    running: RunningStats,
    total_iterations: u64,
    discarded: u64,
}

impl<'c, C: TickSource + ?Sized> Aggregator<'c, C> {
    /// Empty aggregator converting ticks with `clock`
    pub fn new(clock: &'c C) -> Self {
        Self {
            clock,
            per_iteration_us: Vec::new(),
            running: RunningStats::new(),
            total_iterations: 0,
            discarded: 0,
        }
    }

    /// Add a sample. Zero-iteration samples carry no per-iteration time and are discarded.
    pub fn push(&mut self, measurement: SampleMeasurement) {
        match measurement.per_iteration_micros(self.clock) {
            Some(us) => {
                self.per_iteration_us.push(us);
                self.running.push(us);
                self.total_iterations += measurement.iterations;
            }
            None => self.discarded += 1,
        }
    }

    /// Count a sample that was thrown away
    pub fn discard(&mut self) {
        self.discarded += 1;
    }

    /// Samples accepted so far
    pub fn len(&self) -> usize {
        self.per_iteration_us.len()
    }

    /// No samples accepted yet
    pub fn is_empty(&self) -> bool {
        self.per_iteration_us.is_empty()
    }

    /// Samples discarded so far
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Streaming statistics over accepted samples
    pub fn running(&self) -> &RunningStats {
        &self.running
    }

    /// Summarise. Baseline fields are left for the driver to fill in.
    pub fn finish(self, target: Option<f64>) -> AggregateResult {
        AggregateResult {
            summary: compute_summary(&self.per_iteration_us),
            total_samples: self.per_iteration_us.len() as u64,
            total_iterations: self.total_iterations,
            discarded_samples: self.discarded,
            baseline_ratio: None,
            target,
            target_verdict: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MonotonicClock;

    fn sample(elapsed: Ticks, iterations: u64) -> SampleMeasurement {
        SampleMeasurement {
            elapsed,
            iterations,
        }
    }

    #[test]
    fn test_per_iteration_conversion() {
        let clock = MonotonicClock::new();
        // 8000 ns over 4 iterations = 2 us each
        assert_eq!(sample(8_000, 4).per_iteration_micros(&clock), Some(2.0));
        assert_eq!(sample(8_000, 0).per_iteration_micros(&clock), None);
    }

    #[test]
    fn test_samples_weighted_equally() {
        let clock = MonotonicClock::new();
        let mut agg = Aggregator::new(&clock);
        agg.push(sample(1_000, 1)); // 1 us
        agg.push(sample(300_000, 100)); // 3 us

        let result = agg.finish(None);
        assert_eq!(result.total_samples, 2);
        assert_eq!(result.total_iterations, 101);
        assert!((result.mean_us() - 2.0).abs() < 1e-12);
        assert_eq!(result.min_us(), 1.0);
        assert_eq!(result.ops_per_second(), Some(500_000.0));
    }

    #[test]
    fn test_discards_are_counted_not_summarised() {
        let clock = MonotonicClock::new();
        let mut agg = Aggregator::new(&clock);
        agg.push(sample(5_000, 1));
        agg.push(sample(5_000, 0));
        agg.discard();

        assert_eq!(agg.len(), 1);
        let result = agg.finish(None);
        assert_eq!(result.discarded_samples, 2);
        assert_eq!(result.summary.sample_count, 1);
    }

    #[test]
    fn test_baseline_is_exactly_one() {
        let clock = MonotonicClock::new();
        let mut agg = Aggregator::new(&clock);
        agg.push(sample(3_333, 7));
        let mut result = agg.finish(None);
        result.mark_as_baseline();
        assert_eq!(result.baseline_ratio, Some(1.0));
    }

    #[test]
    fn test_compare_to_baseline_checks_target() {
        let clock = MonotonicClock::new();
        let mut agg = Aggregator::new(&clock);
        agg.push(sample(4_000, 1));
        let mut result = agg.finish(Some(0.5));

        result.compare_to_baseline(10.0);
        assert_eq!(result.baseline_ratio, Some(0.4));
        assert_eq!(result.target_verdict, Some(TargetVerdict::Met));
        assert!(!result.missed_target());

        result.compare_to_baseline(5.0);
        assert_eq!(result.baseline_ratio, Some(0.8));
        assert!(result.missed_target());

        result.compare_to_baseline(0.0);
        assert_eq!(result.baseline_ratio, None);
        assert_eq!(result.target_verdict, None);
        assert!(!result.missed_target());
    }
}
