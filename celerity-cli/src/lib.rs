#![warn(missing_docs)]
//! Celerity CLI Library
//!
//! Command-line front end for benchmark binaries. Register benchmarks, then
//! call `celerity::run()` (or `celerity_cli::run()`) from `main` to get
//! filtering, configuration, progress output and reports.
//!
//! # Example
//!
//! ```no_run
//! use celerity_core::{do_not_optimize, from_body, register_baseline, register_benchmark};
//!
//! fn main() -> anyhow::Result<()> {
//!     register_baseline("sum", "loop", 30, 1_000, from_body(|| {
//!         do_not_optimize((0..64u64).sum::<u64>());
//!     }))?;
//!     register_benchmark("sum", "formula", 30, 1_000, from_body(|| {
//!         do_not_optimize(63 * 64 / 2u64);
//!     }), Some(0.9))?;
//!     celerity_cli::run()
//! }
//! ```

mod config;
mod formatting;
mod planner;
mod progress;

pub use config::*;
pub use formatting::{format_distribution, format_human_output};
pub use planner::Selection;
pub use progress::ProgressReporter;

use anyhow::Context;
use celerity_core::{
    ExperimentRunner, FailurePolicy, RunDriver, RunPlan, RunnerConfig, build_distribution_with,
    with_registry,
};
use celerity_report::{OutputFormat, Report, build_report, build_report_meta, export};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Celerity CLI arguments
#[derive(Parser, Debug)]
#[command(name = "celerity")]
#[command(author, version, about = "Celerity - baseline-relative micro-benchmarks")]
pub struct Cli {
    /// Run benchmarks whose `group/name` matches this regex
    pub filter: Option<String>,

    /// Run benchmarks for this group only
    #[arg(short, long)]
    pub group: Option<String>,

    /// Output format: human, json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// List the benchmarks that would run, without running them
    #[arg(long)]
    pub list: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Re-run a failed benchmark up to N more times
    #[arg(long)]
    pub retries: Option<u32>,

    /// Discard failing samples instead of failing the benchmark
    #[arg(long)]
    pub skip_failed_samples: bool,

    /// Pin the measuring thread to this CPU
    #[arg(long)]
    pub pin_cpu: Option<usize>,

    /// Measure the timer itself: N samples of a no-op body
    #[arg(long, value_name = "N")]
    pub distribution: Option<u64>,

    /// Iterations per sample for --distribution
    #[arg(long, value_name = "M", default_value_t = 1000)]
    pub distribution_iterations: u64,

    /// Exit successfully even when a benchmark misses its target
    #[arg(long)]
    pub no_fail: bool,

    /// Internal: Absorb cargo bench's --bench flag
    #[arg(long, hide = true)]
    pub bench: bool,
}

/// How a CLI invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing failed
    Success,
    /// A benchmark failed or missed its target
    Failures,
}

/// Run the Celerity CLI with the process arguments.
/// This is the main entry point for benchmark binaries.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Celerity CLI with pre-parsed arguments, exiting with status 1
/// when a benchmark fails or misses its target.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    if execute(&cli)? == RunOutcome::Failures {
        std::process::exit(1);
    }
    Ok(())
}

/// Install the global subscriber; `RUST_LOG` wins over the defaults
fn init_logging(verbose: bool) {
    let default = if verbose { "celerity=debug" } else { "celerity=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when run() is called twice
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Layer defaults, `celerity.toml` and command-line flags into a runner config
pub fn build_runner_config(cli: &Cli, config: &CelerityConfig) -> anyhow::Result<RunnerConfig> {
    let mut runner = config.runner_config()?;
    if let Some(n) = cli.retries {
        runner.retries = n;
    }
    if cli.skip_failed_samples {
        runner.failure_policy = FailurePolicy::SkipSample;
    }
    if cli.pin_cpu.is_some() {
        runner.pin_cpu = cli.pin_cpu;
    }
    runner.validate()?;
    Ok(runner)
}

/// Execute one CLI invocation against the process-wide registry
pub fn execute(cli: &Cli) -> anyhow::Result<RunOutcome> {
    let config = CelerityConfig::discover()?;
    let runner_config = build_runner_config(cli, &config)?;

    let format = cli
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse::<OutputFormat>()
        .map_err(anyhow::Error::msg)?;
    let output_path = cli.output.clone().or_else(|| config.output.file.clone());

    if let Some(samples) = cli.distribution {
        let runner = ExperimentRunner::new(runner_config);
        runner.prepare();
        let values = build_distribution_with(&runner, samples, cli.distribution_iterations);
        write_output(
            output_path.as_ref(),
            &format_distribution(&values, cli.distribution_iterations),
        )?;
        return Ok(RunOutcome::Success);
    }

    let selection =
        Selection::new(cli.filter.as_deref(), cli.group.as_deref()).context("invalid filter")?;

    if cli.list {
        let plan = with_registry(|reg| selection.plan(reg));
        print_plan(&plan);
        return Ok(RunOutcome::Success);
    }

    let driver = RunDriver::new(runner_config);
    let mut progress = ProgressReporter::new();
    let start_time = Instant::now();
    let records = celerity_core::run_with(&driver, |d| selection.matches(d), &mut progress)
        .context("benchmark registration is invalid")?;

    if records.is_empty() {
        println!("No benchmarks found.");
        return Ok(RunOutcome::Success);
    }

    let total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    let report = build_report(
        build_report_meta(driver.runner().config()),
        &records,
        total_duration_ms,
    );

    let output = render(&report, format)?;
    write_output(output_path.as_ref(), &output)?;

    Ok(outcome(&report, cli.no_fail))
}

fn render(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Human => format_human_output(report),
        other => export(report, other)?,
    })
}

fn write_output(path: Option<&PathBuf>, output: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            file.write_all(output.as_bytes())?;
            println!("Report written to: {}", path.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}

fn outcome(report: &Report, no_fail: bool) -> RunOutcome {
    let summary = &report.summary;
    if !summary.has_failures() {
        return RunOutcome::Success;
    }
    if summary.failed > 0 {
        eprintln!("\n{} benchmark(s) failed during execution", summary.failed);
        return RunOutcome::Failures;
    }
    if summary.target_missed > 0 {
        eprintln!("\n{} benchmark(s) missed their target", summary.target_missed);
        if !no_fail {
            return RunOutcome::Failures;
        }
    }
    RunOutcome::Success
}

fn print_plan(plan: &RunPlan) {
    println!("Celerity Plan:");
    for group in &plan.groups {
        println!("├── group: {}", group.name);
        if let Some(b) = &group.baseline {
            println!("│   ├── {} (baseline, {})", b.id(), sampling(b.samples(), b.iterations()));
        }
        for b in &group.benchmarks {
            let target = b
                .target()
                .map(|t| format!(", target {:.3}", t))
                .unwrap_or_default();
            println!(
                "│   ├── {} ({}{})",
                b.id(),
                sampling(b.samples(), b.iterations()),
                target
            );
        }
    }
    println!("{} benchmarks found.", plan.len());
}

fn sampling(samples: u64, iterations: u64) -> String {
    if samples == 0 {
        format!("auto samples x {} iterations", iterations)
    } else {
        format!("{} samples x {} iterations", samples, iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celerity_core::{NullReporter, Registry, from_body};

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("celerity").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flag_parsing() {
        let c = cli(&["sort/.*", "--group", "sort", "--format", "csv", "--retries", "2"]);
        assert_eq!(c.filter.as_deref(), Some("sort/.*"));
        assert_eq!(c.group.as_deref(), Some("sort"));
        assert_eq!(c.format.as_deref(), Some("csv"));
        assert_eq!(c.retries, Some(2));
        assert_eq!(c.distribution_iterations, 1000);

        let c = cli(&["--distribution", "100", "--distribution-iterations", "50", "--bench"]);
        assert_eq!(c.distribution, Some(100));
        assert_eq!(c.distribution_iterations, 50);
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = CelerityConfig::parse("[runner]\nretries = 3\npin_cpu = 1").unwrap();

        let runner = build_runner_config(&cli(&[]), &config).unwrap();
        assert_eq!(runner.retries, 3);
        assert_eq!(runner.pin_cpu, Some(1));
        assert_eq!(runner.failure_policy, FailurePolicy::AbortDescriptor);

        let runner = build_runner_config(
            &cli(&["--retries", "0", "--skip-failed-samples", "--pin-cpu", "4"]),
            &config,
        )
        .unwrap();
        assert_eq!(runner.retries, 0);
        assert_eq!(runner.pin_cpu, Some(4));
        assert_eq!(runner.failure_policy, FailurePolicy::SkipSample);
    }

    fn report_for(reg: &Registry) -> Report {
        let records = RunDriver::default().run(reg, &mut NullReporter).unwrap();
        build_report(build_report_meta(&RunnerConfig::default()), &records, 0.0)
    }

    #[test]
    fn test_outcome() {
        let mut reg = Registry::new();
        reg.register_baseline("g", "base", 2, 1, from_body(|| {})).unwrap();
        let report = report_for(&reg);
        assert!(!report.summary.has_failures());
        assert_eq!(outcome(&report, false), RunOutcome::Success);

        reg.register_benchmark("g", "slow", 2, 1, from_body(|| {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }), Some(0.5))
        .unwrap();
        let report = report_for(&reg);
        assert_eq!(outcome(&report, false), RunOutcome::Failures);
        assert_eq!(outcome(&report, true), RunOutcome::Success);

        reg.register_benchmark("g", "broken", 2, 1, from_body(|| panic!("x")), None).unwrap();
        let report = report_for(&reg);
        assert_eq!(outcome(&report, true), RunOutcome::Failures);
    }

    #[test]
    fn test_render_formats() {
        let mut reg = Registry::new();
        reg.register_baseline("g", "base", 2, 1, from_body(|| {})).unwrap();
        let report = report_for(&reg);

        assert!(render(&report, OutputFormat::Human).unwrap().contains("Celerity Results"));
        assert!(render(&report, OutputFormat::Csv).unwrap().starts_with("Group,Experiment"));
        assert!(render(&report, OutputFormat::Json).unwrap().contains("\"schema_version\""));
    }

    #[test]
    fn test_sampling_label() {
        assert_eq!(sampling(0, 10), "auto samples x 10 iterations");
        assert_eq!(sampling(5, 1), "5 samples x 1 iterations");
    }
}
