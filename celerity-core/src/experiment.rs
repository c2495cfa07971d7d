//! Experiments and Factories
//!
//! An [`Experiment`] is one fixture plus benchmark body. The runner asks an
//! [`ExperimentFactory`] for a fresh instance per sample, calls
//! `on_experiment_start`, times `run_iterations`, then calls
//! `on_experiment_end` and drops the instance.
//!
//! `run_iterations` is a provided method, so the loop is monomorphized per
//! experiment type: the only dynamic call inside a timed region is the single
//! `run_iterations` dispatch itself.

use crate::error::BoxError;
use std::fmt;
use std::marker::PhantomData;

/// Result type for fixture hooks
pub type HookResult = Result<(), BoxError>;

/// Keep the optimizer from discarding a value or the work producing it.
#[inline(always)]
pub fn do_not_optimize<T>(value: T) -> T {
    std::hint::black_box(value)
}

/// A fixture and the body it measures
pub trait Experiment {
    /// Untimed setup, once per instance
    fn on_experiment_start(&mut self) -> HookResult {
        Ok(())
    }

    /// One iteration of the measured work
    fn body(&mut self);

    /// Untimed teardown, once per instance
    fn on_experiment_end(&mut self) -> HookResult {
        Ok(())
    }

    /// Run the body `iterations` times back to back. Executed inside the timed region.
    #[inline]
    fn run_iterations(&mut self, iterations: u64) {
        for _ in 0..iterations {
            self.body();
        }
    }
}

/// Produces fresh experiment instances on demand
pub trait ExperimentFactory: Send + Sync {
    /// Construct a new instance
    fn create(&self) -> Box<dyn Experiment>;
}

impl<F: ExperimentFactory + ?Sized> ExperimentFactory for std::sync::Arc<F> {
    fn create(&self) -> Box<dyn Experiment> {
        (**self).create()
    }
}

/// Factory constructing `E::default()` for each sample
pub struct DefaultFactory<E>(PhantomData<fn() -> E>);

impl<E> DefaultFactory<E> {
    /// Create the factory
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for DefaultFactory<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for DefaultFactory<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DefaultFactory")
            .field(&std::any::type_name::<E>())
            .finish()
    }
}

impl<E: Experiment + Default + 'static> ExperimentFactory for DefaultFactory<E> {
    fn create(&self) -> Box<dyn Experiment> {
        Box::new(E::default())
    }
}

/// Factory calling a constructor closure for each sample
pub struct FnFactory<F>(F);

/// Build a factory from a constructor closure.
///
/// ```
/// use celerity_core::{Experiment, ExperimentFactory, factory_fn};
///
/// struct Sum { data: Vec<u64> }
/// impl Experiment for Sum {
///     fn body(&mut self) {
///         celerity_core::do_not_optimize(self.data.iter().sum::<u64>());
///     }
/// }
///
/// let factory = factory_fn(|| Sum { data: (0..64).collect() });
/// let mut exp = factory.create();
/// exp.run_iterations(3);
/// ```
pub fn factory_fn<E, F>(make: F) -> FnFactory<F>
where
    E: Experiment + 'static,
    F: Fn() -> E + Send + Sync,
{
    FnFactory(make)
}

impl<E, F> ExperimentFactory for FnFactory<F>
where
    E: Experiment + 'static,
    F: Fn() -> E + Send + Sync,
{
    fn create(&self) -> Box<dyn Experiment> {
        Box::new((self.0)())
    }
}

/// Experiment with no fixture: just a body closure
pub struct BodyExperiment<F> {
    body: F,
}

impl<F: FnMut()> Experiment for BodyExperiment<F> {
    #[inline]
    fn body(&mut self) {
        (self.body)();
    }
}

/// Factory cloning a body closure into a fresh [`BodyExperiment`] per sample
#[derive(Clone)]
pub struct BodyFactory<F>(F);

/// Build a factory for a fixture-less benchmark body.
pub fn from_body<F>(body: F) -> BodyFactory<F>
where
    F: Fn() + Clone + Send + Sync + 'static,
{
    BodyFactory(body)
}

impl<F> ExperimentFactory for BodyFactory<F>
where
    F: Fn() + Clone + Send + Sync + 'static,
{
    fn create(&self) -> Box<dyn Experiment> {
        Box::new(BodyExperiment {
            body: self.0.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct Counter {
        hits: u64,
    }

    impl Experiment for Counter {
        fn body(&mut self) {
            self.hits += 1;
        }

        fn on_experiment_end(&mut self) -> HookResult {
            if self.hits == 7 {
                Ok(())
            } else {
                Err(format!("expected 7 hits, saw {}", self.hits).into())
            }
        }
    }

    #[test]
    fn test_run_iterations_calls_body_exactly_n_times() {
        let mut exp = Counter::default();
        exp.run_iterations(7);
        assert_eq!(exp.hits, 7);
        assert!(exp.on_experiment_end().is_ok());
    }

    #[test]
    fn test_default_factory_builds_fresh_instances() {
        let factory = DefaultFactory::<Counter>::new();
        let mut first = factory.create();
        first.run_iterations(7);
        assert!(first.on_experiment_end().is_ok());

        let mut second = factory.create();
        assert!(second.on_experiment_end().is_err());
    }

    #[test]
    fn test_body_factory_shares_captured_state() {
        let calls = Arc::new(AtomicU64::new(0));
        let c = Arc::clone(&calls);
        let factory = from_body(move || {
            c.fetch_add(1, Ordering::Relaxed);
        });

        factory.create().run_iterations(4);
        factory.create().run_iterations(6);
        assert_eq!(calls.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn test_zero_iterations_runs_nothing() {
        let mut exp = Counter::default();
        exp.run_iterations(0);
        assert_eq!(exp.hits, 0);
    }

    #[test]
    fn test_arc_factory_delegates() {
        let factory: Arc<dyn ExperimentFactory> = Arc::new(DefaultFactory::<Counter>::new());
        let mut exp = factory.create();
        exp.run_iterations(7);
        assert!(exp.on_experiment_end().is_ok());
    }
}
