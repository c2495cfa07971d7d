//! Report Data Structures

use celerity_core::{AggregateResult, ExecutionError, LifecyclePhase, RunRecord, RunnerConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version of the serialized report layout
pub const SCHEMA_VERSION: u32 = 1;

/// Complete benchmark report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub results: Vec<BenchmarkReportResult>,
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub schema_version: u32,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub git_commit: Option<String>,
    pub system: SystemInfo,
    pub config: RunnerConfig,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu: String,
    pub cpu_cores: u32,
}

/// Individual benchmark result in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReportResult {
    pub id: String,
    pub group: String,
    pub name: String,
    pub is_baseline: bool,
    pub status: BenchmarkStatus,
    /// Registered sample count (0 = adaptive)
    pub samples: u64,
    pub iterations: u64,
    pub target: Option<f64>,
    pub metrics: Option<BenchmarkMetrics>,
    pub failure: Option<FailureInfo>,
}

/// Benchmark execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkStatus {
    Passed,
    TargetMissed,
    Failed,
}

/// Benchmark timing metrics, per iteration, in microseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub samples: u64,
    pub iterations: u64,
    pub discarded_samples: u64,
    pub min_us: f64,
    pub max_us: f64,
    pub mean_us: f64,
    pub median_us: f64,
    pub std_dev_us: f64,
    pub p95_us: f64,
    pub cv_percent: f64,
    pub relative_standard_error: f64,
    pub ops_per_sec: Option<f64>,
    pub baseline_ratio: Option<f64>,
}

impl From<&AggregateResult> for BenchmarkMetrics {
    fn from(agg: &AggregateResult) -> Self {
        let s = &agg.summary;
        Self {
            samples: agg.total_samples,
            iterations: agg.total_iterations,
            discarded_samples: agg.discarded_samples,
            min_us: s.min,
            max_us: s.max,
            mean_us: s.mean,
            median_us: s.median(),
            std_dev_us: s.std_dev,
            p95_us: s.quantiles.p95,
            cv_percent: s.coefficient_of_variation(),
            relative_standard_error: s.relative_standard_error(),
            ops_per_sec: agg.ops_per_second(),
            baseline_ratio: agg.baseline_ratio,
        }
    }
}

/// Failure information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureInfo {
    pub kind: String,
    pub phase: Option<LifecyclePhase>,
    pub message: String,
}

impl From<&ExecutionError> for FailureInfo {
    fn from(err: &ExecutionError) -> Self {
        let kind = match err {
            ExecutionError::Hook { .. } => "hook_error",
            ExecutionError::Panicked { .. } => "panic",
            ExecutionError::NoValidSamples { .. } => "no_valid_samples",
        };
        Self {
            kind: kind.to_string(),
            phase: err.phase(),
            message: err.to_string(),
        }
    }
}

/// Report summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_benchmarks: usize,
    pub passed: usize,
    pub target_missed: usize,
    pub failed: usize,
    pub total_duration_ms: f64,
}

impl ReportSummary {
    /// Anything failed or missed its target
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.target_missed > 0
    }
}

impl From<&RunRecord> for BenchmarkReportResult {
    fn from(record: &RunRecord) -> Self {
        let d = &record.descriptor;
        let (status, metrics, failure) = match &record.outcome {
            Ok(agg) if agg.missed_target() => {
                (BenchmarkStatus::TargetMissed, Some(agg.into()), None)
            }
            Ok(agg) => (BenchmarkStatus::Passed, Some(agg.into()), None),
            Err(e) => (BenchmarkStatus::Failed, None, Some(e.into())),
        };
        Self {
            id: d.id(),
            group: d.group().to_string(),
            name: d.name().to_string(),
            is_baseline: d.is_baseline(),
            status,
            samples: d.samples(),
            iterations: d.iterations(),
            target: d.target(),
            metrics,
            failure,
        }
    }
}

/// Build a complete report from run records, in execution order
pub fn build_report(meta: ReportMeta, records: &[RunRecord], total_duration_ms: f64) -> Report {
    let results: Vec<BenchmarkReportResult> = records.iter().map(Into::into).collect();

    let mut summary = ReportSummary {
        total_benchmarks: results.len(),
        total_duration_ms,
        ..Default::default()
    };
    for r in &results {
        match r.status {
            BenchmarkStatus::Passed => summary.passed += 1,
            BenchmarkStatus::TargetMissed => summary.target_missed += 1,
            BenchmarkStatus::Failed => summary.failed += 1,
        }
    }

    Report {
        meta,
        results,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_report_meta;
    use celerity_core::{Registry, RunDriver, RunnerConfig, from_body, NullReporter};

    fn records() -> Vec<RunRecord> {
        let mut reg = Registry::new();
        reg.register_baseline("g", "base", 3, 2, from_body(|| {})).unwrap();
        reg.register_benchmark("g", "slow", 3, 2, from_body(|| {
            std::thread::sleep(std::time::Duration::from_millis(2));
        }), Some(1.1))
        .unwrap();
        reg.register_benchmark("g", "broken", 3, 2, from_body(|| panic!("oops")), None)
            .unwrap();
        RunDriver::default().run(&reg, &mut NullReporter).unwrap()
    }

    #[test]
    fn test_statuses_and_summary() {
        let meta = build_report_meta(&RunnerConfig::default());
        let report = build_report(meta, &records(), 12.5);

        let statuses: Vec<_> = report.results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            [
                BenchmarkStatus::Passed,
                BenchmarkStatus::TargetMissed,
                BenchmarkStatus::Failed
            ]
        );
        assert_eq!(
            report.summary,
            ReportSummary {
                total_benchmarks: 3,
                passed: 1,
                target_missed: 1,
                failed: 1,
                total_duration_ms: 12.5,
            }
        );
        assert!(report.summary.has_failures());
    }

    #[test]
    fn test_result_fields() {
        let meta = build_report_meta(&RunnerConfig::default());
        let report = build_report(meta, &records(), 0.0);

        let base = &report.results[0];
        assert!(base.is_baseline);
        assert_eq!(base.id, "g/base");
        let m = base.metrics.as_ref().unwrap();
        assert_eq!(m.baseline_ratio, Some(1.0));
        assert_eq!(m.samples, 3);
        assert_eq!(m.iterations, 6);
        assert!(m.min_us <= m.mean_us);

        let broken = &report.results[2];
        assert!(broken.metrics.is_none());
        let failure = broken.failure.as_ref().unwrap();
        assert_eq!(failure.kind, "panic");
        assert_eq!(failure.phase, Some(LifecyclePhase::Body));
        assert!(failure.message.contains("oops"));
    }
}
