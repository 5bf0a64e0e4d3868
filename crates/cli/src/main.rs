mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use topomatch_core::{load_config, TopomatchClient};

use commands::Command;

/// Config file read when neither --config nor TOPOMATCH_CONFIG is given.
const DEFAULT_CONFIG_FILE: &str = "topomatch.toml";

#[derive(Parser)]
#[command(name = "topomatch")]
#[command(about = "Match climbing topo photos against a reference corpus")]
#[command(version)]
struct Cli {
    /// TOML config file; environment variables prefixed TOPOMATCH_ override it.
    #[arg(long, env = "TOPOMATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.or_else(|| {
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    });
    match &config_path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No config file, reading configuration from environment"),
    }

    let config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    let client = TopomatchClient::new(&config).context("Invalid configuration")?;
    info!("Matching service at {}", client.transport().base_url());

    commands::run(&client, cli.command).await
}
