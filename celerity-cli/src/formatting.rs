//! Output Formatting
//!
//! Human-readable output for benchmark reports and calibration runs.
//!
//! The result table mirrors the CSV export: one row per benchmark with
//! samples, iterations, baseline ratio, microseconds per iteration and
//! iterations per second. Failures and missed targets follow the table.

use celerity_report::{BenchmarkStatus, Report};
use celerity_stats::compute_summary;

const COLUMNS: [&str; 8] = [
    "Group",
    "Experiment",
    "Samples",
    "Iterations",
    "Baseline",
    "us/Iteration",
    "Iterations/sec",
    "Status",
];

/// Format a report for terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Celerity Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    let rows: Vec<[String; 8]> = report
        .results
        .iter()
        .map(|r| {
            let status = match r.status {
                BenchmarkStatus::Passed => "ok".to_string(),
                BenchmarkStatus::TargetMissed => match r.target {
                    Some(t) => format!("MISSED (target {:.3})", t),
                    None => "MISSED".to_string(),
                },
                BenchmarkStatus::Failed => "FAILED".to_string(),
            };
            let name = if r.is_baseline {
                format!("{} *", r.name)
            } else {
                r.name.clone()
            };
            match &r.metrics {
                Some(m) => [
                    r.group.clone(),
                    name,
                    m.samples.to_string(),
                    r.iterations.to_string(),
                    m.baseline_ratio
                        .map(|x| format!("{:.5}", x))
                        .unwrap_or_else(|| "-".to_string()),
                    format!("{:.5}", m.mean_us),
                    m.ops_per_sec
                        .map(|x| format!("{:.2}", x))
                        .unwrap_or_else(|| "-".to_string()),
                    status,
                ],
                None => [
                    r.group.clone(),
                    name,
                    "-".into(),
                    "-".into(),
                    "-".into(),
                    "-".into(),
                    "-".into(),
                    status,
                ],
            }
        })
        .collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    push_row(&mut output, &COLUMNS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&format!("|-{}-|\n", rule.join("-|-")));
    for row in &rows {
        push_row(&mut output, row, &widths);
    }
    output.push_str("  * baseline\n");

    let failures: Vec<_> = report
        .results
        .iter()
        .filter_map(|r| r.failure.as_ref().map(|f| (r, f)))
        .collect();
    if !failures.is_empty() {
        output.push_str("\nFailures\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for (r, f) in failures {
            output.push_str(&format!("  ✗ {}: {}\n", r.id, f.message));
        }
    }

    let details: Vec<_> = report
        .results
        .iter()
        .filter_map(|r| r.metrics.as_ref().map(|m| (r, m)))
        .collect();
    if !details.is_empty() {
        output.push_str("\nDetails (us/iteration)\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for (r, m) in details {
            output.push_str(&format!(
                "  {}  min: {:.3}  median: {:.3}  p95: {:.3}  max: {:.3}  cv: {:.2}%",
                r.id, m.min_us, m.median_us, m.p95_us, m.max_us, m.cv_percent
            ));
            if m.discarded_samples > 0 {
                output.push_str(&format!("  discarded: {}", m.discarded_samples));
            }
            output.push('\n');
        }
    }

    output.push_str("\nSummary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Total: {}  Passed: {}  Target missed: {}  Failed: {}\n",
        report.summary.total_benchmarks,
        report.summary.passed,
        report.summary.target_missed,
        report.summary.failed
    ));
    output.push_str(&format!(
        "  Duration: {:.2} ms\n",
        report.summary.total_duration_ms
    ));

    output
}

fn push_row(output: &mut String, cells: &[String; 8], widths: &[usize; 8]) {
    output.push('|');
    for (i, (cell, w)) in cells.iter().zip(widths).enumerate() {
        // Text columns left-aligned, numbers right-aligned
        if i < 2 || i == 7 {
            output.push_str(&format!(" {:<w$} |", cell, w = w));
        } else {
            output.push_str(&format!(" {:>w$} |", cell, w = w));
        }
    }
    output.push('\n');
}

/// Format a calibration distribution: the raw values followed by a summary
pub fn format_distribution(values: &[u64], iterations_per_sample: u64) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Timer distribution: {} samples x {} iterations (us per sample)\n",
        values.len(),
        iterations_per_sample
    ));
    for chunk in values.chunks(10) {
        let line: Vec<String> = chunk.iter().map(|v| format!("{:>6}", v)).collect();
        output.push_str(&line.join(" "));
        output.push('\n');
    }

    let as_f64: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    let s = compute_summary(&as_f64);
    output.push_str(&format!(
        "min: {:.0}  median: {:.1}  mean: {:.2}  p95: {:.1}  max: {:.0}  stddev: {:.2}\n",
        s.min,
        s.median(),
        s.mean,
        s.quantiles.p95,
        s.max,
        s.std_dev
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use celerity_core::{NullReporter, Registry, RunDriver, RunnerConfig, from_body};
    use celerity_report::{build_report, build_report_meta};

    fn report() -> Report {
        let mut reg = Registry::new();
        reg.register_baseline("io", "read", 2, 1, from_body(|| {})).unwrap();
        reg.register_benchmark("io", "write", 2, 1, from_body(|| panic!("disk full")), None)
            .unwrap();
        let records = RunDriver::default().run(&reg, &mut NullReporter).unwrap();
        build_report(build_report_meta(&RunnerConfig::default()), &records, 1.0)
    }

    #[test]
    fn test_table_layout() {
        let out = format_human_output(&report());
        let header = out.lines().find(|l| l.starts_with("| Group")).unwrap();
        for col in COLUMNS {
            assert!(header.contains(col));
        }
        let base = out.lines().find(|l| l.contains("read *")).unwrap();
        assert!(base.contains("1.00000"));
        assert!(base.contains(" ok "));

        // Every table line has the same width
        let widths: Vec<_> = out
            .lines()
            .filter(|l| l.starts_with('|'))
            .map(|l| l.chars().count())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_iterations_column_is_per_sample() {
        let mut reg = Registry::new();
        reg.register_baseline("cpu", "spin", 3, 5, from_body(|| {})).unwrap();
        let records = RunDriver::default().run(&reg, &mut NullReporter).unwrap();
        let report = build_report(build_report_meta(&RunnerConfig::default()), &records, 1.0);

        let out = format_human_output(&report);
        let line = out.lines().find(|l| l.contains("spin *")).unwrap();
        let cells: Vec<_> = line.split('|').map(str::trim).collect();
        assert_eq!(cells[3], "3");
        assert_eq!(cells[4], "5");
    }

    #[test]
    fn test_failures_listed() {
        let out = format_human_output(&report());
        assert!(out.contains("FAILED"));
        assert!(out.contains("io/write: sample 0: panic in benchmark body: disk full"));
        assert!(out.contains("Total: 2  Passed: 1  Target missed: 0  Failed: 1"));
    }

    #[test]
    fn test_distribution_output() {
        let out = format_distribution(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], 1000);
        assert!(out.starts_with("Timer distribution: 11 samples x 1000 iterations"));
        assert_eq!(out.lines().count(), 4);
        assert!(out.contains("min: 1  median: 6.0"));
    }
}
