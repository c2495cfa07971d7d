//! Celerity example suite
//!
//! Run with:
//!   cargo run --example sleep_groups                        # Run all benchmarks
//!   cargo run --example sleep_groups -- --list              # List benchmarks
//!   cargo run --example sleep_groups -- --group sleep       # Run one group
//!   cargo run --example sleep_groups -- --format csv        # CSV table
//!   cargo run --example sleep_groups -- --distribution 100  # Timer noise

use celerity::prelude::*;
use std::thread::sleep;
use std::time::Duration;

/// Sorting fixture: fresh reversed input for every sample
#[derive(Default)]
struct ReversedInput {
    data: Vec<u64>,
}

impl Experiment for ReversedInput {
    fn on_experiment_start(&mut self) -> HookResult {
        self.data = (0..10_000).rev().collect();
        Ok(())
    }

    fn body(&mut self) {
        let mut d = self.data.clone();
        d.sort();
        do_not_optimize(d);
    }
}

struct UnstableSort(ReversedInput);

impl Experiment for UnstableSort {
    fn on_experiment_start(&mut self) -> HookResult {
        self.0.on_experiment_start()
    }

    fn body(&mut self) {
        let mut d = self.0.data.clone();
        d.sort_unstable();
        do_not_optimize(d);
    }
}

fn main() -> anyhow::Result<()> {
    register_baseline("sleep", "1ms", 30, 1, from_body(|| sleep(Duration::from_millis(1))))?;
    register_benchmark(
        "sleep",
        "500us",
        30,
        1,
        from_body(|| sleep(Duration::from_micros(500))),
        Some(0.75),
    )?;

    register_baseline("sort", "stable", 20, 10, DefaultFactory::<ReversedInput>::new())?;
    register_benchmark(
        "sort",
        "unstable",
        0,
        10,
        factory_fn(|| UnstableSort(ReversedInput::default())),
        None,
    )?;

    register_benchmark(
        "math",
        "sum_formula",
        50,
        100_000,
        from_body(|| {
            let n = do_not_optimize(1_000u64);
            do_not_optimize(n * (n + 1) / 2);
        }),
        None,
    )?;

    celerity::run()
}
