//! Run Driver
//!
//! Walks groups in discovery order, runs each group's baseline first and then
//! its other descriptors, attaches baseline ratios, and hands every record to
//! a [`Reporter`] as soon as it exists. An execution failure is recorded and
//! the run moves on; only configuration errors stop a run, and they do so
//! before any timing begins.

use crate::aggregate::AggregateResult;
use crate::clock::{MonotonicClock, TickSource};
use crate::error::{ConfigurationError, ExecutionError};
use crate::registry::{BenchmarkDescriptor, DescriptorHandle, Registry};
use crate::runner::{ExperimentRunner, RunnerConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome for one descriptor
#[derive(Debug)]
pub struct RunRecord {
    /// Descriptor that ran
    pub descriptor: DescriptorHandle,
    /// Aggregate on success, the failure otherwise
    pub outcome: Result<AggregateResult, ExecutionError>,
}

impl RunRecord {
    /// Aggregate, if the descriptor completed
    pub fn aggregate(&self) -> Option<&AggregateResult> {
        self.outcome.as_ref().ok()
    }

    /// Failure, if the descriptor did not complete
    pub fn error(&self) -> Option<&ExecutionError> {
        self.outcome.as_ref().err()
    }

    /// Completed and did not miss a target
    pub fn passed(&self) -> bool {
        self.aggregate().is_some_and(|a| !a.missed_target())
    }
}

/// One group as it will be executed
#[derive(Debug, Clone)]
pub struct PlannedGroup {
    /// Group name
    pub name: String,
    /// Baseline, if registered (run even when the filter excluded it)
    pub baseline: Option<DescriptorHandle>,
    /// Selected non-baseline descriptors in registration order
    pub benchmarks: Vec<DescriptorHandle>,
}

/// Ordered execution plan
#[derive(Debug, Clone, Default)]
pub struct RunPlan {
    /// Groups in discovery order
    pub groups: Vec<PlannedGroup>,
}

impl RunPlan {
    /// Select descriptors with `filter`.
    ///
    /// A group is included when any of its descriptors match; its baseline is
    /// then always included so ratios stay defined.
    pub fn build<F>(registry: &Registry, filter: F) -> Self
    where
        F: Fn(&BenchmarkDescriptor) -> bool,
    {
        let groups = registry
            .groups()
            .iter()
            .filter_map(|group| {
                let benchmarks: Vec<_> = group
                    .benchmarks()
                    .iter()
                    .filter(|d| filter(d))
                    .cloned()
                    .collect();
                let baseline_selected = group.baseline().is_some_and(|b| filter(b));
                if benchmarks.is_empty() && !baseline_selected {
                    return None;
                }
                Some(PlannedGroup {
                    name: group.name().to_string(),
                    baseline: group.baseline().cloned(),
                    benchmarks,
                })
            })
            .collect();
        Self { groups }
    }

    /// Descriptors in execution order
    pub fn descriptors(&self) -> impl Iterator<Item = &DescriptorHandle> {
        self.groups
            .iter()
            .flat_map(|g| g.baseline.iter().chain(g.benchmarks.iter()))
    }

    /// Number of descriptors to execute
    pub fn len(&self) -> usize {
        self.descriptors().count()
    }

    /// Nothing to execute
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Receives results as the driver produces them
pub trait Reporter {
    /// Called once before the first descriptor
    fn on_run_start(&mut self, _plan: &RunPlan) {}

    /// Called before each descriptor starts
    fn on_descriptor_start(&mut self, _descriptor: &BenchmarkDescriptor) {}

    /// Called once per descriptor, in execution order
    fn on_record(&mut self, record: &RunRecord);

    /// Called once after the last descriptor
    fn on_run_end(&mut self, _records: &[RunRecord]) {}
}

/// Reporter that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn on_record(&mut self, _record: &RunRecord) {}
}

/// Executes plans one descriptor at a time on the calling thread
pub struct RunDriver<C = MonotonicClock> {
    runner: ExperimentRunner<C>,
}

impl RunDriver<MonotonicClock> {
    /// Driver on the monotonic clock
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_runner(ExperimentRunner::new(config))
    }
}

impl Default for RunDriver<MonotonicClock> {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

impl<C: TickSource> RunDriver<C> {
    /// Driver around an existing runner
    pub fn with_runner(runner: ExperimentRunner<C>) -> Self {
        Self { runner }
    }

    /// Underlying runner
    pub fn runner(&self) -> &ExperimentRunner<C> {
        &self.runner
    }

    /// Run every descriptor in `registry`
    pub fn run(
        &self,
        registry: &Registry,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<RunRecord>, ConfigurationError> {
        self.run_filtered(registry, |_| true, reporter)
    }

    /// Validate, plan with `filter`, and run
    pub fn run_filtered<F>(
        &self,
        registry: &Registry,
        filter: F,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<RunRecord>, ConfigurationError>
    where
        F: Fn(&BenchmarkDescriptor) -> bool,
    {
        self.runner.config().validate()?;
        registry.validate()?;
        let plan = RunPlan::build(registry, filter);
        Ok(self.run_plan(&plan, reporter))
    }

    /// Run an already built plan
    pub fn run_plan(&self, plan: &RunPlan, reporter: &mut dyn Reporter) -> Vec<RunRecord> {
        let started = Instant::now();
        let mut records = Vec::with_capacity(plan.len());

        info!(
            groups = plan.groups.len(),
            benchmarks = plan.len(),
            "starting benchmark run"
        );
        reporter.on_run_start(plan);
        self.runner.prepare();

        for group in &plan.groups {
            let mut baseline_mean = None;

            if let Some(baseline) = &group.baseline {
                let record = self.execute(baseline, reporter, |agg| {
                    agg.mark_as_baseline();
                });
                baseline_mean = record.aggregate().map(AggregateResult::mean_us);
                if baseline_mean.is_none() {
                    warn!(group = %group.name, "baseline failed, ratios unavailable for this group");
                }
                reporter.on_record(&record);
                records.push(record);
            }

            for bench in &group.benchmarks {
                let record = self.execute(bench, reporter, |agg| {
                    if let Some(mean) = baseline_mean {
                        agg.compare_to_baseline(mean);
                    }
                });
                reporter.on_record(&record);
                records.push(record);
            }
        }

        let failed = records.iter().filter(|r| r.error().is_some()).count();
        info!(
            completed = records.len() - failed,
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "benchmark run finished"
        );
        reporter.on_run_end(&records);
        records
    }

    fn execute<F>(
        &self,
        descriptor: &DescriptorHandle,
        reporter: &mut dyn Reporter,
        finish: F,
    ) -> RunRecord
    where
        F: FnOnce(&mut AggregateResult),
    {
        reporter.on_descriptor_start(descriptor);
        info!(benchmark = %descriptor.id(), "running");

        let outcome = self.runner.run(descriptor).map(|mut agg| {
            finish(&mut agg);
            agg
        });
        if let Err(e) = &outcome {
            warn!(benchmark = %descriptor.id(), error = %e, "benchmark failed");
        }

        RunRecord {
            descriptor: Arc::clone(descriptor),
            outcome,
        }
    }
}
