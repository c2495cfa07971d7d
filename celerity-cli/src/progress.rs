//! Console progress while benchmarks run.

use celerity_core::{BenchmarkDescriptor, Reporter, RunPlan, RunRecord};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar advanced between benchmarks, never during a timed sample
pub struct ProgressReporter {
    pb: ProgressBar,
}

impl ProgressReporter {
    /// Hidden until the plan is known
    pub fn new() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ProgressReporter {
    fn on_run_start(&mut self, plan: &RunPlan) {
        let pb = ProgressBar::new(plan.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.pb = pb;
    }

    fn on_descriptor_start(&mut self, descriptor: &BenchmarkDescriptor) {
        self.pb.set_message(descriptor.id());
    }

    fn on_record(&mut self, record: &RunRecord) {
        if let Some(e) = record.error() {
            self.pb
                .println(format!("✗ {} failed: {}", record.descriptor.id(), e));
        }
        self.pb.inc(1);
    }

    fn on_run_end(&mut self, _records: &[RunRecord]) {
        self.pb.finish_with_message("Complete");
    }
}
