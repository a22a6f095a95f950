//! ColonyCore command line
//!
//! Usage:
//!   colonycore demo
//!   colonycore templates --config colonycore.toml

use anyhow::Result;
use clap::{Parser, Subcommand};
use colonycore_cli::{list_templates, run_demo};
use colonycore_host::ColonyConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "colonycore")]
#[command(about = "ColonyCore transactional colony store")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "colonycore.toml", global = true)]
    config: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed a demo colony and walk through rules and exports
    Demo,
    /// List installed dataset templates as JSON
    Templates,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = ColonyConfig::load_from(&args.config);
    match args.command {
        Command::Demo => {
            info!("ColonyCore demo starting...");
            let report = run_demo(&config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Templates => {
            let templates = list_templates(&config).await?;
            println!("{}", serde_json::to_string_pretty(&templates)?);
        }
    }
    Ok(())
}
