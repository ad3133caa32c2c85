//! Command-line interface for number_master.

use clap::{Parser, Subcommand};

use number_master::ReconcileStrategy;

/// Number Master - guess the number, beat the champion
#[derive(Parser, Debug)]
#[command(name = "number_master")]
#[command(about = "Number guessing game with a persisted leaderboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = "number_master.toml")]
    pub config: std::path::PathBuf,

    /// Database file (overrides the config file)
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Reconcile strategy (overrides the config file)
    #[arg(long, global = true)]
    pub strategy: Option<ReconcileStrategy>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play rounds in the terminal
    Play {
        /// Player name (prompted for if omitted)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show the current champion
    Champion,

    /// Check whether a player already has a record
    Lookup {
        /// Player name to look up
        #[arg(short, long)]
        name: String,
    },
}
