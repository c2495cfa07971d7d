//! Benchmark Planner
//!
//! Decides which registered benchmarks a run includes.
//!
//! Filtering options:
//! - Regex pattern matching on the `group/name` id
//! - Group filtering
//!
//! Ordering stays in discovery order. A group's baseline is added back by
//! [`RunPlan::build`] whenever any member of the group is selected.

use celerity_core::{BenchmarkDescriptor, Registry, RunPlan};
use regex::Regex;

/// Benchmark selection from command-line filters
#[derive(Debug, Clone, Default)]
pub struct Selection {
    filter: Option<Regex>,
    group: Option<String>,
}

impl Selection {
    /// Compile a selection. A pattern of `.*` or none selects everything.
    pub fn new(pattern: Option<&str>, group: Option<&str>) -> Result<Self, regex::Error> {
        let filter = match pattern {
            None | Some(".*") | Some("") => None,
            Some(p) => Some(Regex::new(p)?),
        };
        Ok(Self {
            filter,
            group: group.map(str::to_string),
        })
    }

    /// Whether `descriptor` is selected
    pub fn matches(&self, descriptor: &BenchmarkDescriptor) -> bool {
        if let Some(g) = &self.group {
            if descriptor.group() != g {
                return false;
            }
        }
        match &self.filter {
            Some(re) => re.is_match(&descriptor.id()),
            None => true,
        }
    }

    /// Plan the selected benchmarks of `registry`
    pub fn plan(&self, registry: &Registry) -> RunPlan {
        RunPlan::build(registry, |d| self.matches(d))
    }
}
