//! Phase-specific typestate structs for a guessing round.
//!
//! Each phase is its own type. A [`RoundWon`] ALWAYS carries its score,
//! and only a [`RoundInProgress`] can accept a guess, so "guess after win"
//! cannot be expressed at this level.

use super::action::{Guess, GuessError};
use super::contracts::{Contract, GuessContract};
use super::invariants::GuessHistory;
use super::types::{GuessEntry, GuessResult, Target};
use crate::ranking::Score;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Instant;
use tracing::{debug, info, instrument};

// ─────────────────────────────────────────────────────────────
//  Setup Phase
// ─────────────────────────────────────────────────────────────

/// Round in setup phase: target chosen, clock not started.
#[derive(Debug, Clone)]
pub struct RoundSetup {
    target: Target,
}

impl RoundSetup {
    /// Creates a round with a uniformly random target.
    #[instrument]
    pub fn new() -> Self {
        Self::with_target(Target::random())
    }

    /// Creates a round with a known target.
    pub fn with_target(target: Target) -> Self {
        Self { target }
    }

    /// Starts the clock now.
    pub fn start(self) -> RoundInProgress {
        self.start_at(Instant::now())
    }

    /// Starts the clock at the given instant.
    #[instrument(skip(self))]
    pub fn start_at(self, started_at: Instant) -> RoundInProgress {
        debug!("Round started");
        RoundInProgress {
            target: self.target,
            history: Vec::new(),
            started_at,
            started_wall: Utc::now(),
        }
    }
}

impl Default for RoundSetup {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────
//  InProgress Phase
// ─────────────────────────────────────────────────────────────

/// Round awaiting a guess.
#[derive(Debug, Clone)]
pub struct RoundInProgress {
    target: Target,
    history: Vec<GuessEntry>,
    started_at: Instant,
    // Wall-clock anchor for `started_at`; entry timestamps are offsets from it.
    started_wall: DateTime<Utc>,
}

impl RoundInProgress {
    /// Applies a guess made now.
    pub fn guess(self, guess: Guess) -> Result<RoundResult, Rejected> {
        self.guess_at(guess, Instant::now())
    }

    /// Applies a guess made at `at`, consuming self.
    ///
    /// A rejected guess hands the unchanged round back inside [`Rejected`].
    ///
    /// Contract enforcement:
    /// - Preconditions checked always
    /// - Postconditions checked in debug builds only
    #[instrument(skip(self), fields(attempts = self.history.len()))]
    pub fn guess_at(self, guess: Guess, at: Instant) -> Result<RoundResult, Rejected> {
        if let Err(error) = GuessContract::pre(&self, &guess) {
            debug!(%error, "Guess rejected");
            return Err(Rejected { round: self, error });
        }

        #[cfg(debug_assertions)]
        let before = self.clone();

        let result = self.target.classify(guess);
        let elapsed = at.saturating_duration_since(self.started_at);
        let timestamp = self.wall_time(elapsed);
        let mut round = self;
        round
            .history
            .insert(0, GuessEntry::new(guess, result, timestamp));

        let next = if result == GuessResult::Correct {
            let score = Score::from_elapsed(round.history.len() as u32, elapsed);
            info!(%score, "Target found");
            RoundResult::Won(RoundWon {
                target: round.target,
                history: round.history,
                started_at: round.started_at,
                won_at: at,
                score,
            })
        } else {
            debug!(%result, "Guess classified");
            RoundResult::InProgress(round)
        };

        #[cfg(debug_assertions)]
        if let Err(error) = GuessContract::post(&before, &next) {
            return Err(Rejected {
                round: before,
                error,
            });
        }

        Ok(next)
    }

    /// Returns guess history, most recent first.
    pub fn history(&self) -> &[GuessEntry] {
        &self.history
    }

    fn wall_time(&self, elapsed: std::time::Duration) -> DateTime<Utc> {
        TimeDelta::from_std(elapsed)
            .ok()
            .and_then(|offset| self.started_wall.checked_add_signed(offset))
            .unwrap_or(self.started_wall)
    }

    /// Number of guesses recorded so far.
    pub fn attempts(&self) -> usize {
        self.history.len()
    }

    /// Instant the clock started.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Whole seconds elapsed at `now`, for a running display counter.
    pub fn elapsed_whole_seconds(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.started_at).as_secs()
    }

    /// Replays guesses from a fresh round, stopping at the first win.
    #[instrument(skip(guesses), fields(count = guesses.len()))]
    pub fn replay(target: Target, guesses: &[Guess]) -> Result<RoundResult, GuessError> {
        let mut round = RoundSetup::with_target(target).start();

        for guess in guesses {
            match round.guess(*guess).map_err(Rejected::into_error)? {
                RoundResult::InProgress(r) => round = r,
                won @ RoundResult::Won(_) => return Ok(won),
            }
        }

        Ok(RoundResult::InProgress(round))
    }
}

impl GuessHistory for RoundInProgress {
    fn history(&self) -> &[GuessEntry] {
        &self.history
    }

    fn is_won(&self) -> bool {
        false
    }
}

/// A guess the round refused, with the untouched round.
#[derive(Debug, Clone)]
pub struct Rejected {
    round: RoundInProgress,
    error: GuessError,
}

impl Rejected {
    /// Returns the rejection reason.
    pub fn error(&self) -> &GuessError {
        &self.error
    }

    /// Returns the round so play can continue.
    pub fn into_round(self) -> RoundInProgress {
        self.round
    }

    /// Discards the round, keeping the error.
    pub fn into_error(self) -> GuessError {
        self.error
    }
}

// ─────────────────────────────────────────────────────────────
//  Won Phase
// ─────────────────────────────────────────────────────────────

/// Round won: the score is always present.
#[derive(Debug, Clone)]
pub struct RoundWon {
    target: Target,
    history: Vec<GuessEntry>,
    started_at: Instant,
    won_at: Instant,
    score: Score,
}

impl RoundWon {
    /// Final score, captured at the winning guess.
    pub fn score(&self) -> Score {
        self.score
    }

    /// The revealed target.
    pub fn target(&self) -> Target {
        self.target
    }

    /// Returns guess history, most recent (the winning guess) first.
    pub fn history(&self) -> &[GuessEntry] {
        &self.history
    }

    /// Whole seconds between start and win. Frozen once won.
    pub fn elapsed_whole_seconds(&self) -> u64 {
        self.won_at
            .saturating_duration_since(self.started_at)
            .as_secs()
    }

    /// Starts a new round with a fresh random target.
    #[instrument(skip(self))]
    pub fn restart(self) -> RoundSetup {
        RoundSetup::new()
    }
}

impl GuessHistory for RoundWon {
    fn history(&self) -> &[GuessEntry] {
        &self.history
    }

    fn is_won(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────
//  Result Type
// ─────────────────────────────────────────────────────────────

/// Result of applying a guess.
#[derive(Debug, Clone)]
pub enum RoundResult {
    /// Round continues.
    InProgress(RoundInProgress),
    /// Target found.
    Won(RoundWon),
}

impl GuessHistory for RoundResult {
    fn history(&self) -> &[GuessEntry] {
        match self {
            RoundResult::InProgress(r) => r.history(),
            RoundResult::Won(r) => r.history(),
        }
    }

    fn is_won(&self) -> bool {
        matches!(self, RoundResult::Won(_))
    }
}
