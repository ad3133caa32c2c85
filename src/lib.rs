//! Number Master library - number guessing with a persisted leaderboard
//!
//! A player guesses a hidden number between 1 and 100. Each won round is
//! reconciled against the player's stored best and the global champion.
//!
//! # Architecture
//!
//! - **Games**: typestate guessing round and its runtime session wrapper
//! - **Ranking**: the one definition of a better result
//! - **Ledger**: reconciles a won round with the player's record
//! - **Leaderboard**: global champion and per-player lookups
//! - **Db**: score store trait with SQLite and in-memory backends
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use number_master::{MemoryScoreStore, ReconcileStrategy, RoundService};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = RoundService::new(Arc::new(MemoryScoreStore::new()), ReconcileStrategy::default());
//! let mut session = service.start_round("Ann")?;
//! let outcome = session.submit_guess("50")?;
//! if outcome.is_won() {
//!     let report = service.complete_round(&session).await?;
//!     println!("{:?}", report.reconciliation());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod games;
mod leaderboard;
mod ledger;
mod ranking;
mod round_service;
pub mod terminal;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError};

// Crate-level exports - Persistence
pub use db::{
    MemoryScoreStore, NewScoreRecord, ScoreRecord, ScoreRepository, ScoreStore, ScoreUpdate,
    StorageError,
};

// Crate-level exports - Game types
pub use games::number_guess::{
    Contract, GameSession, Guess, GuessContract, GuessEntry, GuessError, GuessHistory,
    GuessOutcome, GuessResult, GuessesInRange, HistoryConsistent, Invariant, InvariantSet,
    InvariantViolation, MAX_NUMBER, MIN_NUMBER, NoDuplicateGuesses, NotYetGuessed, PlayerName,
    Rejected, RoundInProgress, RoundInvariants, RoundResult, RoundSetup, RoundWon, SessionEvent,
    Target,
};

// Crate-level exports - Scoring
pub use leaderboard::LeaderboardQuery;
pub use ledger::{ReconcileStrategy, Reconciliation, ScoreLedger};
pub use ranking::{RankingPolicy, Score};
pub use round_service::{RoundReport, RoundService};
