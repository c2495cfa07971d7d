//! CSV Output
//!
//! One row per benchmark with the columns
//! `Group, Experiment, Samples, Iterations, Baseline, us/Iteration, Iterations/sec, Target, Status`.
//! Iterations is the registered per-sample count. Failed benchmarks keep
//! their row with empty measurement columns.

use crate::report::{BenchmarkStatus, Report};
use std::fmt::Write;

const HEADER: &str = "Group,Experiment,Samples,Iterations,Baseline,us/Iteration,Iterations/sec,Target,Status";

/// Render the report as CSV
pub fn generate_csv_report(report: &Report) -> String {
    let mut out = String::with_capacity(64 * (report.results.len() + 1));
    out.push_str(HEADER);
    out.push('\n');

    for r in &report.results {
        let _ = write!(out, "{},{},", escape(&r.group), escape(&r.name));
        match &r.metrics {
            Some(m) => {
                let ratio = m.baseline_ratio.map(|x| format!("{x:.5}")).unwrap_or_default();
                let ops = m.ops_per_sec.map(|x| format!("{x:.2}")).unwrap_or_default();
                let _ = write!(
                    out,
                    "{},{},{},{:.5},{},",
                    m.samples, r.iterations, ratio, m.mean_us, ops
                );
            }
            None => {
                let _ = write!(out, ",{},,,,", r.iterations);
            }
        }
        let target = r.target.map(|t| format!("{t:.3}")).unwrap_or_default();
        let _ = writeln!(out, "{},{}", target, status_label(r.status));
    }
    out
}

fn status_label(status: BenchmarkStatus) -> &'static str {
    match status {
        BenchmarkStatus::Passed => "passed",
        BenchmarkStatus::TargetMissed => "target_missed",
        BenchmarkStatus::Failed => "failed",
    }
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{BenchmarkMetrics, BenchmarkReportResult};
    use crate::{build_report, build_report_meta};
    use celerity_core::{NullReporter, Registry, RunDriver, RunnerConfig, from_body};
    use std::time::Duration;

    fn row(group: &str, name: &str, metrics: Option<BenchmarkMetrics>) -> BenchmarkReportResult {
        BenchmarkReportResult {
            id: format!("{group}/{name}"),
            group: group.into(),
            name: name.into(),
            is_baseline: false,
            status: if metrics.is_some() {
                BenchmarkStatus::Passed
            } else {
                BenchmarkStatus::Failed
            },
            samples: 10,
            iterations: 4,
            target: None,
            metrics,
            failure: None,
        }
    }

    fn metrics(mean_us: f64, ratio: Option<f64>) -> BenchmarkMetrics {
        BenchmarkMetrics {
            samples: 10,
            iterations: 40,
            discarded_samples: 0,
            min_us: mean_us,
            max_us: mean_us,
            mean_us,
            median_us: mean_us,
            std_dev_us: 0.0,
            p95_us: mean_us,
            cv_percent: 0.0,
            relative_standard_error: 0.0,
            ops_per_sec: Some(1_000_000.0 / mean_us),
            baseline_ratio: ratio,
        }
    }

    #[test]
    fn test_rows() {
        let mut report = build_report(build_report_meta(&RunnerConfig::default()), &[], 0.0);
        let mut slow = row("sort", "slow", Some(metrics(8.0, Some(4.0))));
        slow.status = BenchmarkStatus::TargetMissed;
        slow.target = Some(2.0);
        let mut broken = row("sort", "broken", None);
        broken.target = Some(1.5);
        report.results = vec![
            row("sort", "std", Some(metrics(2.0, Some(1.0)))),
            row("sort", "quick, v2", Some(metrics(1.0, Some(0.5)))),
            row("misc", "alone", Some(metrics(4.0, None))),
            slow,
            broken,
        ];

        let csv = generate_csv_report(&report);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "sort,std,10,4,1.00000,2.00000,500000.00,,passed");
        assert_eq!(lines[2], "sort,\"quick, v2\",10,4,0.50000,1.00000,1000000.00,,passed");
        assert_eq!(lines[3], "misc,alone,10,4,,4.00000,250000.00,,passed");
        assert_eq!(lines[4], "sort,slow,10,4,4.00000,8.00000,125000.00,2.000,target_missed");
        assert_eq!(lines[5], "sort,broken,,4,,,,1.500,failed");
        for line in &lines[1..] {
            assert_eq!(line.matches(',').count(), 8 + usize::from(line.contains('"')));
        }
    }

    #[test]
    fn test_missed_target_visible_in_csv() {
        let mut reg = Registry::new();
        reg.register_baseline("io", "noop", 3, 1, from_body(|| {})).unwrap();
        reg.register_benchmark(
            "io",
            "sleepy",
            3,
            1,
            from_body(|| std::thread::sleep(Duration::from_millis(2))),
            Some(0.5),
        )
        .unwrap();
        let records = RunDriver::default().run(&reg, &mut NullReporter).unwrap();
        let report = build_report(build_report_meta(&RunnerConfig::default()), &records, 0.0);

        let csv = generate_csv_report(&report);
        let row = csv.lines().find(|l| l.starts_with("io,sleepy,")).unwrap();
        assert!(row.starts_with("io,sleepy,3,1,"), "{row}");
        assert!(row.ends_with(",0.500,target_missed"), "{row}");
    }

    #[test]
    fn test_quote_escaping() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
