//! Apex Control - CLI consumer of the prediction pipeline.
//!
//! Thin presentation layer: loads a config, hands it to the agent, renders
//! states and results. No prediction logic lives here.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apexctl")]
#[command(about = "Apex - race-win prediction agent", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the driver grid (live when the registry is reachable)
    Drivers,

    /// List the race calendar
    Tracks,

    /// Predict a driver's win probability at a circuit
    Predict {
        /// Driver id (lowercase surname, e.g. "verstappen")
        #[arg(long)]
        driver: String,

        /// Track id (e.g. "zandvoort")
        #[arg(long)]
        track: String,

        /// Fail instead of simulating when live data is unreachable
        #[arg(long)]
        strict: bool,

        /// Credential for the narrative service (falls back to
        /// APEX_API_CREDENTIAL)
        #[arg(long)]
        credential: Option<String>,
    },

    /// Check connectivity to the telemetry and narrative services
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = commands::resolve_config(cli.config.as_deref());

    match cli.command {
        Commands::Drivers => commands::drivers(config).await,
        Commands::Tracks => commands::tracks(config).await,
        Commands::Predict {
            driver,
            track,
            strict,
            credential,
        } => commands::predict(config, &driver, &track, strict, credential).await,
        Commands::Doctor => commands::doctor(config).await,
    }
}
