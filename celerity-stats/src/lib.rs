#![warn(missing_docs)]
//! Celerity Statistical Engine
//!
//! Turns per-iteration timing values into comparable metrics:
//! - Summary statistics (minimum, mean, median, dispersion, throughput)
//! - Quantiles over the raw sample set
//! - Baseline ratios and target verdicts
//! - Streaming accumulation and the adaptive stopping rule used when a
//!   benchmark asks the harness to pick its own sample count
//!
//! All values are plain `f64` microseconds per iteration. Conversion from clock
//! ticks happens in `celerity-core` before anything reaches this crate.

mod percentiles;
mod ratio;
mod running;
mod stopping;
mod summary;

pub use percentiles::{Quantiles, compute_percentile, compute_quantiles};
pub use ratio::{TargetVerdict, baseline_ratio, evaluate_target};
pub use running::RunningStats;
pub use stopping::{StopDecision, StoppingRule, StoppingRuleError};
pub use summary::{SummaryStatistics, compute_summary};

/// Microseconds in one second, used for throughput conversion.
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Default minimum samples before the adaptive rule may stop.
pub const DEFAULT_MIN_SAMPLES: usize = 10;

/// Default hard cap on adaptively chosen sample counts.
pub const DEFAULT_MAX_SAMPLES: usize = 1_000;

/// Default relative standard error the adaptive rule aims for (1%).
pub const DEFAULT_TARGET_RSE: f64 = 0.01;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_MIN_SAMPLES, 10);
        assert_eq!(DEFAULT_MAX_SAMPLES, 1_000);
        assert!((DEFAULT_TARGET_RSE - 0.01).abs() < f64::EPSILON);
        assert!((MICROS_PER_SECOND - 1e6).abs() < f64::EPSILON);
    }
}
