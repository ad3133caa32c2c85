//! Number Master - terminal game
//!
//! Guess the number, beat your own record, take the crown.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use number_master::{AppConfig, RoundService, ScoreRepository, terminal};
use tokio::io::BufReader;
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    initialize_tracing(&config);

    info!(db_path = %config.db_path(), strategy = %config.strategy(), "Starting Number Master");

    // One store handle per process, shared by ledger and leaderboard.
    let repository = ScoreRepository::open(config.db_path().clone())?;
    let service = RoundService::new(Arc::new(repository), *config.strategy());

    let mut input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();

    match cli.command {
        Command::Play { name } => terminal::play(&service, name, &mut input, &mut output).await,
        Command::Champion => terminal::show_champion(&service, &mut output).await,
        Command::Lookup { name } => terminal::lookup(&service, &name, &mut output).await,
    }
}

/// Reads the config file and applies command-line overrides.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_default(&cli.config)?;

    if let Some(db_path) = &cli.db_path {
        config = config.with_db_path(db_path.clone());
    }
    if let Some(strategy) = cli.strategy {
        config = config.with_strategy(strategy);
    }

    Ok(config)
}

/// Logs go to stderr so the game prompt on stdout stays readable.
#[instrument(skip(config))]
fn initialize_tracing(config: &AppConfig) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Tracing initialized");
}
