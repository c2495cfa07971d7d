//! Error taxonomy for registration and execution.

use crate::clock::Ticks;
use celerity_stats::StoppingRuleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Boxed error returned by fixture hooks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Invalid registrations. Fatal before any timing begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Group names must be non-empty
    #[error("group name must not be empty")]
    EmptyGroupName,

    /// Benchmark names must be non-empty
    #[error("benchmark name in group '{group}' must not be empty")]
    EmptyBenchmarkName {
        /// Group being registered into
        group: String,
    },

    /// `(group, name)` already registered
    #[error("benchmark '{group}/{name}' is already registered")]
    DuplicateName {
        /// Group name
        group: String,
        /// Benchmark name
        name: String,
    },

    /// Second baseline for a group
    #[error("group '{group}' already has baseline '{existing}', cannot register '{name}'")]
    DuplicateBaseline {
        /// Group name
        group: String,
        /// Baseline already registered
        existing: String,
        /// Rejected baseline
        name: String,
    },

    /// Zero iterations per sample
    #[error("benchmark '{group}/{name}' must run at least one iteration per sample")]
    ZeroIterations {
        /// Group name
        group: String,
        /// Benchmark name
        name: String,
    },

    /// Target ratio that is not a positive finite number
    #[error("benchmark '{group}/{name}' has invalid target ratio {target}")]
    InvalidTarget {
        /// Group name
        group: String,
        /// Benchmark name
        name: String,
        /// Rejected target
        target: f64,
    },

    /// A target ratio needs a baseline to be compared against
    #[error("benchmark '{group}/{name}' declares a target but group '{group}' has no baseline")]
    MissingBaseline {
        /// Group name
        group: String,
        /// Benchmark name
        name: String,
    },

    /// Registration attempted while a run holds the registry
    #[error("the benchmark registry is sealed while a run is in progress")]
    RegistrySealed,

    /// Adaptive sampling parameters are unusable
    #[error("invalid adaptive sampling rule: {0}")]
    Sampling(#[from] StoppingRuleError),
}

/// Where in the fixture lifecycle a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// Factory constructing the experiment
    Construct,
    /// `on_experiment_start`
    Start,
    /// The timed body
    Body,
    /// `on_experiment_end`
    End,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecyclePhase::Construct => "construction",
            LifecyclePhase::Start => "on_experiment_start",
            LifecyclePhase::Body => "benchmark body",
            LifecyclePhase::End => "on_experiment_end",
        };
        f.write_str(s)
    }
}

/// Failure while executing a descriptor. Recovered at the descriptor boundary.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A fixture hook returned an error
    #[error("sample {sample}: {phase} failed: {source}")]
    Hook {
        /// Failing phase
        phase: LifecyclePhase,
        /// Zero-based sample index
        sample: u64,
        /// Error returned by the hook
        #[source]
        source: BoxError,
    },

    /// User code panicked
    #[error("sample {sample}: panic in {phase}: {message}")]
    Panicked {
        /// Failing phase
        phase: LifecyclePhase,
        /// Zero-based sample index
        sample: u64,
        /// Panic payload rendered as text
        message: String,
    },

    /// Every sample was discarded
    #[error("no valid samples were collected ({discarded} discarded)")]
    NoValidSamples {
        /// Samples thrown away by anomalies or skipped failures
        discarded: u64,
    },
}

impl ExecutionError {
    /// Lifecycle phase the error originated in, if it came from a sample
    pub fn phase(&self) -> Option<LifecyclePhase> {
        match self {
            ExecutionError::Hook { phase, .. } | ExecutionError::Panicked { phase, .. } => {
                Some(*phase)
            }
            ExecutionError::NoValidSamples { .. } => None,
        }
    }

    pub(crate) fn from_panic(
        phase: LifecyclePhase,
        sample: u64,
        payload: Box<dyn std::any::Any + Send>,
    ) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        ExecutionError::Panicked {
            phase,
            sample,
            message,
        }
    }
}

/// Implausible reading. Advisory: the sample is discarded, the run goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MeasurementAnomaly {
    /// End reading precedes start reading
    #[error("clock went backwards ({start} -> {end})")]
    ClockWentBackwards {
        /// Reading before the body
        start: Ticks,
        /// Reading after the body
        end: Ticks,
    },
}
