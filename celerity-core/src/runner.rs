//! Experiment Runner
//!
//! Executes one descriptor: `samples` × `iterations` through the fixture
//! lifecycle, one fresh experiment per sample.
//!
//! ```text
//! factory.create()
//!     │
//!     ▼
//! on_experiment_start()          untimed
//!     │
//!     ▼
//! t0 ─ run_iterations(n) ─ t1    timed, nothing else inside
//!     │
//!     ▼
//! on_experiment_end()            untimed
//!     │
//!     ▼
//! drop, emit SampleMeasurement { t1 - t0, n }
//! ```
//!
//! With `samples == 0` the sample count is chosen by the adaptive
//! [`StoppingRule`], bounded by a clock-time budget.

use crate::aggregate::{AggregateResult, Aggregator, SampleMeasurement};
use crate::clock::{MonotonicClock, TickSource, elapsed_between, pin_current_thread};
use crate::error::{ConfigurationError, ExecutionError, LifecyclePhase, MeasurementAnomaly};
use crate::experiment::{ExperimentFactory, HookResult};
use crate::registry::BenchmarkDescriptor;
use celerity_stats::{StopDecision, StoppingRule};
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, warn};

/// Default clock-time budget for adaptive sampling (5 seconds)
pub const DEFAULT_MAX_ADAPTIVE_TIME_NS: u64 = 5_000_000_000;

/// What happens when a sample fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Fail the whole descriptor on the first failing sample
    #[default]
    AbortDescriptor,
    /// Discard the failing sample and keep going
    SkipSample,
}

/// Adaptive sampling limits for descriptors registered with zero samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveSampling {
    /// Precision-based stopping rule
    pub rule: StoppingRule,
    /// Clock-time budget per descriptor attempt, in nanoseconds
    pub max_time_ns: u64,
}

impl Default for AdaptiveSampling {
    fn default() -> Self {
        Self {
            rule: StoppingRule::default(),
            max_time_ns: DEFAULT_MAX_ADAPTIVE_TIME_NS,
        }
    }
}

/// Runner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Per-sample failure handling
    pub failure_policy: FailurePolicy,
    /// Extra attempts for a failed descriptor (opt-in, default 0)
    pub retries: u32,
    /// Adaptive sampling limits
    pub adaptive: AdaptiveSampling,
    /// Pin the measuring thread to this CPU before running
    pub pin_cpu: Option<usize>,
}

impl RunnerConfig {
    /// Reject unusable settings before any run starts
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.adaptive.rule.validate()?;
        Ok(())
    }
}

/// Why one sample produced no measurement
#[derive(Debug)]
pub(crate) enum SampleError {
    Execution(ExecutionError),
    Anomaly(MeasurementAnomaly),
}

impl From<ExecutionError> for SampleError {
    fn from(e: ExecutionError) -> Self {
        SampleError::Execution(e)
    }
}

impl From<MeasurementAnomaly> for SampleError {
    fn from(a: MeasurementAnomaly) -> Self {
        SampleError::Anomaly(a)
    }
}

/// Runs descriptors against a tick source
pub struct ExperimentRunner<C = MonotonicClock> {
    clock: C,
    config: RunnerConfig,
}

impl ExperimentRunner<MonotonicClock> {
    /// Runner on the monotonic clock
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_clock(MonotonicClock::new(), config)
    }
}

impl Default for ExperimentRunner<MonotonicClock> {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

impl<C: TickSource> ExperimentRunner<C> {
    /// Runner on a custom tick source
    pub fn with_clock(clock: C, config: RunnerConfig) -> Self {
        Self { clock, config }
    }

    /// Tick source in use
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Active configuration
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// One-time preparation before the first descriptor (thread pinning)
    pub fn prepare(&self) {
        if let Some(cpu) = self.config.pin_cpu {
            match pin_current_thread(cpu) {
                Ok(()) => debug!(cpu, "pinned measuring thread"),
                Err(e) => warn!(cpu, error = %e, "could not pin measuring thread"),
            }
        }
    }

    /// Execute a descriptor, honouring the retry budget.
    pub fn run(&self, descriptor: &BenchmarkDescriptor) -> Result<AggregateResult, ExecutionError> {
        let mut attempt = 0;
        loop {
            match self.run_once(descriptor) {
                Ok(result) => return Ok(result),
                Err(e) if attempt < self.config.retries => {
                    attempt += 1;
                    warn!(
                        benchmark = %descriptor.id(),
                        attempt,
                        error = %e,
                        "benchmark failed, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn run_once(&self, descriptor: &BenchmarkDescriptor) -> Result<AggregateResult, ExecutionError> {
        let mut agg = Aggregator::new(&self.clock);

        if descriptor.is_adaptive() {
            self.sample_adaptively(descriptor, &mut agg)?;
        } else {
            for sample in 0..descriptor.samples() {
                self.collect(descriptor, sample, &mut agg)?;
            }
        }

        if agg.is_empty() {
            return Err(ExecutionError::NoValidSamples {
                discarded: agg.discarded(),
            });
        }
        Ok(agg.finish(descriptor.target()))
    }

    fn sample_adaptively(
        &self,
        descriptor: &BenchmarkDescriptor,
        agg: &mut Aggregator<'_, C>,
    ) -> Result<(), ExecutionError> {
        let AdaptiveSampling { rule, max_time_ns } = self.config.adaptive;
        let start = self.clock.now();
        let mut attempts: u64 = 0;

        loop {
            self.collect(descriptor, attempts, agg)?;
            attempts += 1;

            let decision = rule.decide(agg.running());
            if decision != StopDecision::Continue {
                debug!(
                    benchmark = %descriptor.id(),
                    samples = agg.len(),
                    ?decision,
                    "adaptive sampling finished"
                );
                return Ok(());
            }
            let spent = self.clock.now().saturating_sub(start);
            if self.clock.ticks_to_nanos(spent) >= max_time_ns as f64 {
                debug!(benchmark = %descriptor.id(), samples = agg.len(), "adaptive time budget spent");
                return Ok(());
            }
            // Discarded samples never reach the rule, so bound attempts too.
            if attempts >= rule.max_samples as u64 {
                return Ok(());
            }
        }
    }

    fn collect(
        &self,
        descriptor: &BenchmarkDescriptor,
        sample: u64,
        agg: &mut Aggregator<'_, C>,
    ) -> Result<(), ExecutionError> {
        match self.measure_sample(descriptor.factory(), descriptor.iterations(), sample) {
            Ok(m) => agg.push(m),
            Err(SampleError::Anomaly(a)) => {
                warn!(benchmark = %descriptor.id(), sample, anomaly = %a, "discarding sample");
                agg.discard();
            }
            Err(SampleError::Execution(e)) => match self.config.failure_policy {
                FailurePolicy::AbortDescriptor => return Err(e),
                FailurePolicy::SkipSample => {
                    warn!(benchmark = %descriptor.id(), sample, error = %e, "skipping failed sample");
                    agg.discard();
                }
            },
        }
        Ok(())
    }

    /// Time one sample through the full fixture lifecycle.
    pub(crate) fn measure_sample(
        &self,
        factory: &dyn ExperimentFactory,
        iterations: u64,
        sample: u64,
    ) -> Result<SampleMeasurement, SampleError> {
        let mut experiment = catch_unwind(AssertUnwindSafe(|| factory.create()))
            .map_err(|p| ExecutionError::from_panic(LifecyclePhase::Construct, sample, p))?;

        guard_hook(LifecyclePhase::Start, sample, || experiment.on_experiment_start())?;

        let t0 = self.clock.now();
        let body = catch_unwind(AssertUnwindSafe(|| experiment.run_iterations(iterations)));
        let t1 = self.clock.now();
        body.map_err(|p| ExecutionError::from_panic(LifecyclePhase::Body, sample, p))?;

        guard_hook(LifecyclePhase::End, sample, || experiment.on_experiment_end())?;
        drop(experiment);

        let elapsed = elapsed_between(t0, t1)?;
        Ok(SampleMeasurement {
            elapsed,
            iterations,
        })
    }
}

fn guard_hook<F>(phase: LifecyclePhase, sample: u64, hook: F) -> Result<(), ExecutionError>
where
    F: FnOnce() -> HookResult,
{
    match catch_unwind(AssertUnwindSafe(hook)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(ExecutionError::Hook {
            phase,
            sample,
            source,
        }),
        Err(payload) => Err(ExecutionError::from_panic(phase, sample, payload)),
    }
}
