//! snapsheet - headless bottom sheet scenario runner

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use snapsheet_cli::{run_loaded_scenario, SheetScenario};
use snapsheet_core::SheetConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Replay bottom sheet gesture scenarios without a UI
#[derive(Parser)]
#[command(name = "snapsheet")]
#[command(about = "Headless replay and config checks for the snapsheet controller")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file and print its report
    Run {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Sheet configuration (defaults to snaps at 10/50/90)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also write the report to this path
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Validate a sheet.toml file
    CheckConfig {
        /// Configuration file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            config,
            report,
        } => cmd_run(scenario, config, report),
        Commands::CheckConfig { path } => cmd_check_config(path),
    }
}

fn cmd_run(scenario: PathBuf, config: Option<PathBuf>, report: Option<PathBuf>) -> Result<()> {
    let config = match config {
        Some(path) => SheetConfig::from_path(&path)?,
        None => SheetConfig::default(),
    };
    let loaded = SheetScenario::from_path(&scenario)?;
    info!(
        "Running {} ({} steps)",
        scenario.display(),
        loaded.steps.len()
    );

    let outcome = run_loaded_scenario(&loaded, config)?;
    outcome.write_to_writer(&mut std::io::stdout().lock())?;
    if let Some(path) = report {
        outcome.write_to_path(&path)?;
        info!("Report written to {}", path.display());
    }

    if outcome.is_failed() {
        bail!(
            "scenario failed at step {}",
            outcome.failed_step_index.unwrap_or_default()
        );
    }
    Ok(())
}

fn cmd_check_config(path: PathBuf) -> Result<()> {
    let config = SheetConfig::from_path(&path)?;
    let [collapsed, half, expanded] = config.snap.points();
    println!(
        "{}: ok (snaps {collapsed}/{half}/{expanded}, initial {})",
        path.display(),
        config.snap.initial()
    );
    print!("{}", config.to_toml()?);
    Ok(())
}
