//! TROPHIC - CLI Entry Point
//!
//! Predation consumption and observation likelihoods.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use trophic::analysis::ExportSystem;
use trophic::diagnostics::Severity;
use trophic::{benchmark, Config, Diagnostics, Objective, SyntheticModel};

#[derive(Parser)]
#[command(name = "trophic")]
#[command(version)]
#[command(about = "Predation consumption engine and likelihood scoring for fisheries models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a seeded synthetic model through the whole time window
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "trophic.yaml")]
        config: PathBuf,

        /// Random seed for reproducibility
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output directory, overrides the configured one
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a configuration and read every observation file
    Check {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "trophic.yaml")]
        config: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of steps per trial
        #[arg(short, long, default_value = "40")]
        steps: usize,

        /// Number of independent trials
        #[arg(short, long, default_value = "8")]
        trials: usize,

        /// Seed of the first trial
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "trophic.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seed,
            output,
        } => run_synthetic(config, seed, output),

        Commands::Check { config } => check_config(config),

        Commands::Benchmark {
            steps,
            trials,
            seed,
        } => run_benchmark(steps, trials, seed),

        Commands::Init { output } => generate_config(output),
    }
}

fn load_config(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Ok(Config::from_file(config_path)?)
    } else {
        println!("Using default configuration");
        Ok(Config::default())
    }
}

fn run_synthetic(
    config_path: PathBuf,
    seed: u64,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;
    let output = output.unwrap_or_else(|| PathBuf::from(&config.logging.output_dir));

    println!("=== TROPHIC Synthetic Run ===");
    println!("Window: {} - {}", config.time.first(), config.time.last());
    println!("Seed: {}", seed);
    println!();

    let diag = Diagnostics::new();
    let mut model = SyntheticModel::new(
        config.time.clone(),
        seed,
        config.consumption.max_ratio_consumed,
        diag.clone(),
    )?;

    let start = Instant::now();
    let (total, print_rows) = model.run_with_print()?;
    let elapsed = start.elapsed();

    for wc in model.objective().components() {
        println!(
            "{:<16} {:<16} weight {:>6.2}  likelihood {:>12.4}",
            wc.component.name(),
            wc.component.kind(),
            wc.weight,
            wc.component.likelihood()
        );
    }
    println!();
    println!("Objective: {:.6}", total);
    println!("Warnings: {}", diag.warning_count());
    println!("Time: {:.3}s", elapsed.as_secs_f64());

    if config.logging.write_summary || config.logging.write_print {
        std::fs::create_dir_all(&output)?;
    }
    if config.logging.write_summary {
        let path = output.join("summary.csv");
        ExportSystem::export_summary_csv(&model.objective().summary_rows(), &path)?;
        ExportSystem::export_summary(model.objective(), output.join("summary.txt"))?;
        ExportSystem::export_events_csv(&diag.events(), output.join("events.csv"))?;
        println!("Summary saved to: {:?}", path);
    }
    if config.logging.write_print {
        let path = output.join("print.csv");
        ExportSystem::export_print_csv(&print_rows, &path)?;
        println!("Print file saved to: {:?}", path);
    }

    Ok(())
}

fn check_config(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Configuration Check ===");
    println!("File: {:?}", config_path);
    println!();

    let config = Config::from_file(&config_path)?;
    let diag = Diagnostics::new();
    let objective = Objective::from_configs(&config.likelihood, &config.time, &diag)?;

    println!("Window: {} - {}", config.time.first(), config.time.last());
    println!("Components: {}", objective.len());
    for wc in objective.components() {
        let report = wc.component.load_report();
        println!(
            "  {:<16} {:<16} weight {:>6.2}  steps {:>4}  rows kept {:>6}  dropped {:>6}",
            wc.component.name(),
            wc.component.kind(),
            wc.weight,
            wc.component.steps().len(),
            report.kept,
            report.dropped
        );
    }

    let warnings = diag.warning_count();
    println!();
    println!("Warnings: {}", warnings);
    for event in diag.events().iter().filter(|e| e.severity == Severity::Warning) {
        println!("  {}", event);
    }

    Ok(())
}

fn run_benchmark(steps: usize, trials: usize, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== TROPHIC Benchmark ===");
    println!("Steps: {}", steps);
    println!("Trials: {}", trials);
    println!();

    let result = benchmark(steps, trials, seed)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
