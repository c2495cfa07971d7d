#![warn(missing_docs)]
//! # Celerity
//!
//! Micro-benchmarking harness that measures code against a per-group baseline.
//!
//! - **Groups and baselines**: every group may hold one baseline; other members
//!   are reported as a ratio of their mean time to the baseline's mean
//! - **Fixture lifecycle**: a fresh experiment per sample, with
//!   `on_experiment_start`/`on_experiment_end` hooks outside the timed region
//! - **Targets**: a benchmark may declare the ratio it must stay at or under
//! - **Adaptive sampling**: register with `samples = 0` and sampling stops once
//!   the mean is precise enough
//! - **Failure isolation**: a panicking or failing benchmark is recorded and
//!   the run continues
//! - **Timer calibration**: [`build_distribution`] measures the harness's own noise
//!
//! ## Quick Start
//!
//! ```no_run
//! use celerity::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     register_baseline("vec", "push", 30, 10_000, from_body(|| {
//!         let mut v = Vec::new();
//!         v.push(do_not_optimize(1u32));
//!     }))?;
//!     register_benchmark("vec", "with_capacity", 30, 10_000, from_body(|| {
//!         let mut v = Vec::with_capacity(1);
//!         v.push(do_not_optimize(1u32));
//!     }), Some(1.0))?;
//!     celerity::run()
//! }
//! ```
//!
//! ## Fixtures
//!
//! ```
//! use celerity::prelude::*;
//!
//! #[derive(Default)]
//! struct SortFixture {
//!     data: Vec<u64>,
//! }
//!
//! impl Experiment for SortFixture {
//!     fn on_experiment_start(&mut self) -> HookResult {
//!         self.data = (0..1_000).rev().collect();
//!         Ok(())
//!     }
//!
//!     fn body(&mut self) {
//!         let mut d = self.data.clone();
//!         d.sort_unstable();
//!         do_not_optimize(d);
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry
//!     .register_baseline("sort", "unstable", 5, 10, DefaultFactory::<SortFixture>::new())
//!     .unwrap();
//! ```

pub use celerity_core::{
    AdaptiveSampling, AggregateResult, BenchmarkDescriptor, BodyFactory, ConfigurationError,
    DefaultFactory, DescriptorHandle, ExecutionError, Experiment, ExperimentFactory,
    ExperimentRunner, FailurePolicy, Group, HookResult, LifecyclePhase, MeasurementAnomaly,
    MonotonicClock, NullReporter, Registry, Reporter, RunDriver, RunPlan, RunRecord, RunnerConfig,
    TickSource, build_distribution, clear_registry, do_not_optimize, factory_fn, from_body,
    register_baseline, register_benchmark, with_registry,
};

pub use celerity_stats::{StoppingRule, SummaryStatistics, TargetVerdict};

pub use celerity_report::{OutputFormat, Report, build_report, build_report_meta};

pub use celerity_cli::{Cli, run, run_with_cli};

/// Run every registered benchmark without the CLI, returning the records
pub fn run_registered(reporter: &mut dyn Reporter) -> Result<Vec<RunRecord>, ConfigurationError> {
    celerity_core::run(reporter)
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        DefaultFactory, Experiment, ExperimentFactory, HookResult, Registry, do_not_optimize,
        factory_fn, from_body, register_baseline, register_benchmark,
    };
}
