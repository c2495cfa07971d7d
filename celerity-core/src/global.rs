//! Process-wide registry
//!
//! Benchmarks register here through explicit calls before a run. The
//! registry accepts registrations until [`run`] starts, rejects them with
//! [`ConfigurationError::RegistrySealed`] while the run is in progress, and
//! is reopened afterwards. [`clear_registry`] empties it.

use crate::clock::TickSource;
use crate::driver::{Reporter, RunDriver, RunRecord};
use crate::error::ConfigurationError;
use crate::experiment::ExperimentFactory;
use crate::registry::{BenchmarkDescriptor, DescriptorHandle, Registry};
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

fn registry() -> &'static RwLock<Registry> {
    static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Registry::new()))
}

fn read() -> RwLockReadGuard<'static, Registry> {
    registry().read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, Registry> {
    registry().write().unwrap_or_else(PoisonError::into_inner)
}

/// Register a non-baseline benchmark in the process-wide registry
pub fn register_benchmark<F>(
    group: &str,
    name: &str,
    samples: u64,
    iterations: u64,
    factory: F,
    target: Option<f64>,
) -> Result<DescriptorHandle, ConfigurationError>
where
    F: ExperimentFactory + 'static,
{
    write().register_benchmark(group, name, samples, iterations, factory, target)
}

/// Register a group baseline in the process-wide registry
pub fn register_baseline<F>(
    group: &str,
    name: &str,
    samples: u64,
    iterations: u64,
    factory: F,
) -> Result<DescriptorHandle, ConfigurationError>
where
    F: ExperimentFactory + 'static,
{
    write().register_baseline(group, name, samples, iterations, factory)
}

/// Read access to the process-wide registry
pub fn with_registry<R>(f: impl FnOnce(&Registry) -> R) -> R {
    f(&read())
}

/// Drop every registration
pub fn clear_registry() {
    write().clear();
}

/// Reopens the registry when the run ends, including by unwinding.
struct SealGuard;

impl SealGuard {
    fn seal() -> (Self, Registry) {
        let mut reg = write();
        reg.seal();
        (SealGuard, reg.clone())
    }
}

impl Drop for SealGuard {
    fn drop(&mut self) {
        write().unseal();
    }
}

/// Run every registered benchmark with default settings
pub fn run(reporter: &mut dyn Reporter) -> Result<Vec<RunRecord>, ConfigurationError> {
    run_with(&RunDriver::default(), |_| true, reporter)
}

/// Run the registered benchmarks selected by `filter` on `driver`
pub fn run_with<C, F>(
    driver: &RunDriver<C>,
    filter: F,
    reporter: &mut dyn Reporter,
) -> Result<Vec<RunRecord>, ConfigurationError>
where
    C: TickSource,
    F: Fn(&BenchmarkDescriptor) -> bool,
{
    let (_guard, snapshot) = SealGuard::seal();
    driver.run_filtered(&snapshot, filter, reporter)
}
