//! Core domain types for the number guessing game.

use super::action::{Guess, GuessError};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Smallest number a player may guess.
pub const MIN_NUMBER: u8 = 1;

/// Largest number a player may guess.
pub const MAX_NUMBER: u8 = 100;

/// Hidden number the player is trying to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target(Guess);

impl Target {
    /// Picks a target uniformly at random from the playable range.
    #[instrument]
    pub fn random() -> Self {
        Self(Guess(rand::thread_rng().gen_range(MIN_NUMBER..=MAX_NUMBER)))
    }

    /// Creates a known target (replays and tests).
    pub fn new(value: Guess) -> Self {
        Self(value)
    }

    /// Returns the target number.
    pub fn value(self) -> u8 {
        self.0.value()
    }

    /// Classifies a guess against this target.
    pub fn classify(self, guess: Guess) -> GuessResult {
        match guess.cmp(&self.0) {
            std::cmp::Ordering::Greater => GuessResult::High,
            std::cmp::Ordering::Less => GuessResult::Low,
            std::cmp::Ordering::Equal => GuessResult::Correct,
        }
    }
}

/// Feedback for a single guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum GuessResult {
    /// Guess was below the target; the player must go higher.
    #[display("low")]
    Low,
    /// Guess was above the target; the player must go lower.
    #[display("high")]
    High,
    /// Guess matched the target.
    #[display("correct")]
    Correct,
}

impl GuessResult {
    /// Direction hint shown to the player.
    pub fn hint(self) -> &'static str {
        match self {
            Self::Low => "Higher! (UP)",
            Self::High => "Lower! (DOWN)",
            Self::Correct => "Correct!",
        }
    }
}

/// A classified guess recorded in the round history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessEntry {
    /// The guessed number.
    pub number: Guess,
    /// How the guess compared to the target.
    pub result: GuessResult,
    /// When the guess was made.
    pub timestamp: DateTime<Utc>,
}

impl GuessEntry {
    /// Creates a new history entry.
    pub fn new(number: Guess, result: GuessResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            number,
            result,
            timestamp,
        }
    }
}

impl std::fmt::Display for GuessEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.number, self.result)
    }
}

/// Trimmed, non-empty player name. The natural key of a score record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display)]
#[display("{}", _0)]
pub struct PlayerName(String);

impl PlayerName {
    /// Trims the raw name and rejects blank input.
    #[instrument(skip(raw))]
    pub fn new(raw: impl AsRef<str>) -> Result<Self, GuessError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            Err(GuessError::InvalidPlayerName)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PlayerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
