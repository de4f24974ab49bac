//! Amon Hen CLI
//!
//! Thin orchestration entry point over the `amonhen-*` library crates:
//! drives one-shot `cluster`/`digest` passes and reports platform
//! `status`. Fetch adapters and an HTTP read surface are out of scope.

use amonhen_config::Settings;
use amonhen_core_types::telemetry::{init, Profile};
use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod llm_client;

#[derive(Debug, Parser)]
#[command(name = "amonhen")]
#[command(about = "Amon Hen - Narrative Intelligence Platform", long_about = None)]
struct Cli {
    /// Path to the settings YAML file
    #[arg(long, default_value = "settings.yaml", global = true)]
    config: std::path::PathBuf,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show platform status: item/cluster counts, cost, source health
    Status(commands::status::StatusArgs),
    /// Run one clustering pass over the rolling vector window
    Cluster(commands::cluster::ClusterArgs),
    /// Run divergence/anomaly detection and generate one digest
    Digest(commands::digest::DigestArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init(if cli.verbose {
        Profile::Development
    } else {
        Profile::Production
    });

    let settings = Settings::load(&cli.config)?;

    match cli.command {
        Commands::Status(args) => commands::status::execute(args, &settings),
        Commands::Cluster(args) => commands::cluster::execute(args, &settings).await,
        Commands::Digest(args) => commands::digest::execute(args, &settings).await,
    }
}
