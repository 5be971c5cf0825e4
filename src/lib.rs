//! # TROPHIC
//!
//! Predation consumption engine and observation likelihoods for
//! length-structured fisheries models.
//!
//! ## Features
//!
//! - **Consumption**: linear predators and fleets with overconsumption caps
//! - **Likelihood**: stomach content and catch statistics components
//! - **Parallel**: independent trials run across CPU cores via Rayon
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trophic::{Config, Diagnostics, Objective};
//!
//! let config = Config::from_file("trophic.yaml").unwrap();
//! let diag = Diagnostics::new();
//!
//! // Read every observation file
//! let objective = Objective::from_configs(&config.likelihood, &config.time, &diag).unwrap();
//! println!("Components: {}", objective.len());
//! println!("Warnings: {}", diag.warning_count());
//! ```
//!
//! ## Running a step
//!
//! ```rust,no_run
//! use trophic::aggregate::PredatorAggregator;
//! use trophic::{ConsumptionEngine, Diagnostics, Objective, TimeStep, TimeWindow};
//!
//! let window = TimeWindow::default();
//! let mut engine = ConsumptionEngine::new(Diagnostics::new());
//! let mut objective = Objective::new();
//! // ... add preys, predators, fleets and components ...
//! objective.bind(&engine.registry()).unwrap();
//!
//! engine.step(&window);
//! let mut aggregator = PredatorAggregator::new(&engine);
//! objective.score_step(TimeStep::new(1990, 1), &mut aggregator).unwrap();
//! println!("Objective: {}", objective.total());
//! ```

pub mod aggregate;
pub mod aggregation;
pub mod analysis;
pub mod config;
pub mod diagnostics;
pub mod ecology;
pub mod engine;
pub mod error;
pub mod grid;
pub mod lengths;
pub mod likelihood;
pub mod numeric;
pub mod observations;
pub mod registry;
pub mod stats;
pub mod synthetic;
pub mod time;

// Re-export main types
pub use config::Config;
pub use diagnostics::Diagnostics;
pub use engine::ConsumptionEngine;
pub use error::{Error, Result};
pub use likelihood::Objective;
pub use synthetic::SyntheticModel;
pub use time::{TimeStep, TimeWindow};

use rayon::prelude::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Window of `steps` quarterly steps starting in 1990
fn benchmark_window(steps: usize) -> TimeWindow {
    let last = steps.max(1) as i32 - 1;
    TimeWindow {
        first_year: 1990,
        first_step: 1,
        last_year: 1990 + last / 4,
        last_step: last % 4 + 1,
        steps_per_year: 4,
        substeps: 2,
        step_length: 3.0,
    }
}

/// Run a quick benchmark: `trials` synthetic evaluations in parallel
pub fn benchmark(steps: usize, trials: usize, seed: u64) -> Result<BenchmarkResult> {
    use std::time::Instant;

    let window = benchmark_window(steps);
    let start = Instant::now();

    let outcomes = (0..trials.max(1))
        .into_par_iter()
        .map(|trial| -> Result<(f64, usize)> {
            let diag = Diagnostics::new();
            let mut model = SyntheticModel::new(window.clone(), seed + trial as u64, 0.95, diag.clone())?;
            let total = model.run()?;
            Ok((total, diag.warning_count()))
        })
        .collect::<Result<Vec<(f64, usize)>>>()?;

    let elapsed = start.elapsed().as_secs_f64();
    let trials = outcomes.len();
    let total_steps = (window.steps().len() * trials) as f64;

    Ok(BenchmarkResult {
        steps: window.steps().len(),
        trials,
        elapsed_secs: elapsed,
        steps_per_second: total_steps / elapsed.max(f64::EPSILON),
        mean_objective: outcomes.iter().map(|(t, _)| t).sum::<f64>() / trials as f64,
        warnings: outcomes.iter().map(|(_, w)| w).sum(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub steps: usize,
    pub trials: usize,
    pub elapsed_secs: f64,
    pub steps_per_second: f64,
    pub mean_objective: f64,
    pub warnings: usize,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Steps: {} x {} trials", self.steps, self.trials)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} steps/s", self.steps_per_second)?;
        writeln!(f, "Mean objective: {:.4}", self.mean_objective)?;
        writeln!(f, "Warnings: {}", self.warnings)?;
        Ok(())
    }
}
