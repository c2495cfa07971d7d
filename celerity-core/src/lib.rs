#![warn(missing_docs)]
//! Celerity Core - Measurement Engine
//!
//! This crate provides everything between a registered benchmark and its
//! statistical result:
//! - `Registry` of groups, baselines and benchmark descriptors
//! - `Experiment` lifecycle hooks and factories producing one instance per sample
//! - `ExperimentRunner` timing samples on a monotonic `TickSource`
//! - `RunDriver` executing groups baseline-first and streaming records to a `Reporter`
//! - `build_distribution` for characterising the timer's own noise

mod aggregate;
mod calibration;
mod clock;
mod driver;
mod error;
mod experiment;
mod global;
mod registry;
mod runner;

pub use aggregate::{AggregateResult, Aggregator, SampleMeasurement};
pub use calibration::{build_distribution, build_distribution_with};
pub use clock::{
    MonotonicClock, ScriptedClock, SteppingClock, TickSource, Ticks, elapsed_between,
    pin_current_thread,
};
pub use driver::{NullReporter, PlannedGroup, Reporter, RunDriver, RunPlan, RunRecord};
pub use error::{BoxError, ConfigurationError, ExecutionError, LifecyclePhase, MeasurementAnomaly};
pub use experiment::{
    BodyExperiment, BodyFactory, DefaultFactory, Experiment, ExperimentFactory, FnFactory,
    HookResult, do_not_optimize, factory_fn, from_body,
};
pub use global::{clear_registry, register_baseline, register_benchmark, run, run_with, with_registry};
pub use registry::{BenchmarkDescriptor, DescriptorHandle, Group, Registry};
pub use runner::{
    AdaptiveSampling, DEFAULT_MAX_ADAPTIVE_TIME_NS, ExperimentRunner, FailurePolicy, RunnerConfig,
};
