//! Distribution Calibrator
//!
//! Times a no-op experiment through the same sampling path as real
//! benchmarks and returns the raw per-sample durations. The shape of that
//! distribution is the harness's own noise floor on this machine.

use crate::clock::TickSource;
use crate::experiment::{Experiment, ExperimentFactory, do_not_optimize};
use crate::runner::{ExperimentRunner, SampleError};
use tracing::warn;

/// Re-measure attempts for a sample hit by a clock anomaly
const MAX_ANOMALY_RETRIES: u32 = 8;

/// Upper bound on up-front allocation; longer runs grow the buffer as they go
const MAX_PREALLOCATED_SAMPLES: u64 = 1 << 16;

fn initial_capacity(number_of_samples: u64) -> usize {
    number_of_samples.min(MAX_PREALLOCATED_SAMPLES) as usize
}

struct NullExperiment;

impl Experiment for NullExperiment {
    #[inline]
    fn body(&mut self) {
        do_not_optimize(());
    }
}

struct NullFactory;

impl ExperimentFactory for NullFactory {
    fn create(&self) -> Box<dyn Experiment> {
        Box::new(NullExperiment)
    }
}

/// Whole-sample durations in microseconds for a no-op body, using the
/// monotonic clock.
pub fn build_distribution(number_of_samples: u64, iterations_per_sample: u64) -> Vec<u64> {
    build_distribution_with(
        &ExperimentRunner::default(),
        number_of_samples,
        iterations_per_sample,
    )
}

/// [`build_distribution`] on a specific runner and tick source.
///
/// Values are whole-sample elapsed times rounded to integer microseconds, in
/// sampling order.
pub fn build_distribution_with<C: TickSource>(
    runner: &ExperimentRunner<C>,
    number_of_samples: u64,
    iterations_per_sample: u64,
) -> Vec<u64> {
    let mut values = Vec::with_capacity(initial_capacity(number_of_samples));

    for sample in 0..number_of_samples {
        let mut retries = 0;
        loop {
            match runner.measure_sample(&NullFactory, iterations_per_sample, sample) {
                Ok(m) => {
                    values.push(runner.clock().ticks_to_micros(m.elapsed).round() as u64);
                    break;
                }
                Err(SampleError::Anomaly(a)) if retries < MAX_ANOMALY_RETRIES => {
                    retries += 1;
                    warn!(sample, anomaly = %a, "re-measuring calibration sample");
                }
                Err(SampleError::Anomaly(a)) => {
                    warn!(sample, anomaly = %a, "dropping calibration sample");
                    break;
                }
                Err(SampleError::Execution(e)) => {
                    warn!(sample, error = %e, "calibration sample failed");
                    break;
                }
            }
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ScriptedClock, SteppingClock};
    use crate::runner::RunnerConfig;

    #[test]
    fn test_distribution_length_matches_request() {
        let values = build_distribution(100, 1_000);
        assert_eq!(values.len(), 100);
    }

    #[test]
    fn test_distribution_values_are_whole_sample_micros() {
        let runner = ExperimentRunner::with_clock(SteppingClock::new(2_400), RunnerConfig::default());
        let values = build_distribution_with(&runner, 5, 1_000);
        assert_eq!(values, vec![2; 5]);
    }

    #[test]
    fn test_backwards_reading_is_remeasured() {
        let clock = ScriptedClock::new([5_000, 1_000, 7_000, 10_000]);
        let runner = ExperimentRunner::with_clock(clock, RunnerConfig::default());
        let values = build_distribution_with(&runner, 1, 10);
        assert_eq!(values, vec![3]);
    }

    #[test]
    fn test_preallocation_is_bounded() {
        assert_eq!(initial_capacity(100), 100);
        assert_eq!(initial_capacity(u64::MAX), MAX_PREALLOCATED_SAMPLES as usize);
    }

    #[test]
    fn test_zero_iterations_measures_clock_overhead_only() {
        let values = build_distribution(10, 0);
        assert_eq!(values.len(), 10);
        assert!(values.iter().all(|&us| us < 1_000_000));
    }
}
