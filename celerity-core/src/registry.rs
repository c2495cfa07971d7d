//! Benchmark Registry
//!
//! Ordered collection of groups, each holding an optional baseline and its
//! non-baseline benchmarks in registration order. Descriptors are immutable
//! once registered and shared as [`DescriptorHandle`]s.
//!
//! A registry is populated before a run and only read during one. The
//! process-wide instance in [`crate::global`] enforces that with
//! [`Registry::seal`].

use crate::error::ConfigurationError;
use crate::experiment::ExperimentFactory;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Shared reference to a registered descriptor
pub type DescriptorHandle = Arc<BenchmarkDescriptor>;

/// Registered metadata for one benchmark or baseline
pub struct BenchmarkDescriptor {
    group: String,
    name: String,
    samples: u64,
    iterations: u64,
    factory: Arc<dyn ExperimentFactory>,
    target: Option<f64>,
    is_baseline: bool,
}

impl BenchmarkDescriptor {
    /// Group name
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Benchmark name, unique within the group
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `group/name`
    pub fn id(&self) -> String {
        format!("{}/{}", self.group, self.name)
    }

    /// Requested sample count; 0 means adaptive
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Whether the runner picks the sample count
    pub fn is_adaptive(&self) -> bool {
        self.samples == 0
    }

    /// Iterations per sample (always > 0)
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Factory producing fresh experiments
    pub fn factory(&self) -> &dyn ExperimentFactory {
        self.factory.as_ref()
    }

    /// Target ratio against the group baseline
    pub fn target(&self) -> Option<f64> {
        self.target
    }

    /// Whether this is its group's baseline
    pub fn is_baseline(&self) -> bool {
        self.is_baseline
    }
}

impl fmt::Debug for BenchmarkDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkDescriptor")
            .field("group", &self.group)
            .field("name", &self.name)
            .field("samples", &self.samples)
            .field("iterations", &self.iterations)
            .field("target", &self.target)
            .field("is_baseline", &self.is_baseline)
            .finish_non_exhaustive()
    }
}

/// Descriptors sharing a comparison baseline
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    baseline: Option<DescriptorHandle>,
    benchmarks: Vec<DescriptorHandle>,
}

impl Group {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            baseline: None,
            benchmarks: Vec::new(),
        }
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Baseline descriptor, if one is registered
    pub fn baseline(&self) -> Option<&DescriptorHandle> {
        self.baseline.as_ref()
    }

    /// Non-baseline descriptors in registration order
    pub fn benchmarks(&self) -> &[DescriptorHandle] {
        &self.benchmarks
    }

    /// Baseline first, then the rest in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &DescriptorHandle> {
        self.baseline.iter().chain(self.benchmarks.iter())
    }

    /// Look up a descriptor by name
    pub fn get(&self, name: &str) -> Option<&DescriptorHandle> {
        self.descriptors().find(|d| d.name == name)
    }

    /// Number of descriptors including the baseline
    pub fn len(&self) -> usize {
        self.benchmarks.len() + usize::from(self.baseline.is_some())
    }

    /// No descriptors
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups in discovery order
#[derive(Debug, Clone, Default)]
pub struct Registry {
    groups: Vec<Group>,
    index: HashMap<String, usize>,
    sealed: bool,
}

impl Registry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a non-baseline benchmark
    pub fn register_benchmark<F>(
        &mut self,
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
        if let Some(t) = target {
            if !t.is_finite() || t <= 0.0 {
                return Err(ConfigurationError::InvalidTarget {
                    group: group.to_string(),
                    name: name.to_string(),
                    target: t,
                });
            }
        }
        self.insert(group, name, samples, iterations, Arc::new(factory), target, false)
    }

    /// Register the baseline for a group
    pub fn register_baseline<F>(
        &mut self,
        group: &str,
        name: &str,
        samples: u64,
        iterations: u64,
        factory: F,
    ) -> Result<DescriptorHandle, ConfigurationError>
    where
        F: ExperimentFactory + 'static,
    {
        self.insert(group, name, samples, iterations, Arc::new(factory), None, true)
    }

    #[allow(clippy::too_many_arguments)]
    fn insert(
        &mut self,
        group: &str,
        name: &str,
        samples: u64,
        iterations: u64,
        factory: Arc<dyn ExperimentFactory>,
        target: Option<f64>,
        is_baseline: bool,
    ) -> Result<DescriptorHandle, ConfigurationError> {
        if self.sealed {
            return Err(ConfigurationError::RegistrySealed);
        }
        if group.is_empty() {
            return Err(ConfigurationError::EmptyGroupName);
        }
        if name.is_empty() {
            return Err(ConfigurationError::EmptyBenchmarkName {
                group: group.to_string(),
            });
        }
        if iterations == 0 {
            return Err(ConfigurationError::ZeroIterations {
                group: group.to_string(),
                name: name.to_string(),
            });
        }

        if let Some(existing) = self.group(group) {
            if existing.get(name).is_some() {
                return Err(ConfigurationError::DuplicateName {
                    group: group.to_string(),
                    name: name.to_string(),
                });
            }
            if let (true, Some(base)) = (is_baseline, existing.baseline()) {
                return Err(ConfigurationError::DuplicateBaseline {
                    group: group.to_string(),
                    existing: base.name.clone(),
                    name: name.to_string(),
                });
            }
        }

        let descriptor = Arc::new(BenchmarkDescriptor {
            group: group.to_string(),
            name: name.to_string(),
            samples,
            iterations,
            factory,
            target,
            is_baseline,
        });

        let idx = match self.index.get(group) {
            Some(&idx) => idx,
            None => {
                self.groups.push(Group::new(group));
                self.index.insert(group.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        let slot = &mut self.groups[idx];
        if is_baseline {
            slot.baseline = Some(Arc::clone(&descriptor));
        } else {
            slot.benchmarks.push(Arc::clone(&descriptor));
        }

        debug!(
            group,
            name,
            samples,
            iterations,
            baseline = is_baseline,
            "registered benchmark"
        );
        Ok(descriptor)
    }

    /// Groups in the order they were first seen
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Look up a group
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.index.get(name).map(|&i| &self.groups[i])
    }

    /// Baseline of a group
    pub fn baseline(&self, group: &str) -> Option<&DescriptorHandle> {
        self.group(group).and_then(Group::baseline)
    }

    /// Every descriptor, group by group, baseline first
    pub fn descriptors(&self) -> impl Iterator<Item = &DescriptorHandle> {
        self.groups.iter().flat_map(Group::descriptors)
    }

    /// Total descriptors
    pub fn len(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// No descriptors registered
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Reject further registration
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Allow registration again
    pub fn unseal(&mut self) {
        self.sealed = false;
    }

    /// Whether registration is currently rejected
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Drop every descriptor and reopen for registration
    pub fn clear(&mut self) {
        self.groups.clear();
        self.index.clear();
        self.sealed = false;
    }

    /// Checks that need the complete registry: every target has a baseline.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for group in &self.groups {
            if group.baseline.is_some() {
                continue;
            }
            if let Some(d) = group.benchmarks.iter().find(|d| d.target.is_some()) {
                return Err(ConfigurationError::MissingBaseline {
                    group: d.group.clone(),
                    name: d.name.clone(),
                });
            }
        }
        Ok(())
    }
}
