//! First-class action types for the number guessing game.
//!
//! A guess is a domain event, not a side effect. Parsing and range checking
//! happen when the [`Guess`] is built, so a round only ever sees values
//! that are already known to lie in the playable range.

use super::types::{MAX_NUMBER, MIN_NUMBER};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// A validated guess in `MIN_NUMBER..=MAX_NUMBER`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    derive_more::Display,
)]
#[display("{}", _0)]
pub struct Guess(pub(super) u8);

impl Guess {
    /// Creates a guess from an integer, rejecting values outside the range.
    #[instrument]
    pub fn new(value: i64) -> Result<Self, GuessError> {
        if (i64::from(MIN_NUMBER)..=i64::from(MAX_NUMBER)).contains(&value) {
            // Range check above guarantees the value fits.
            Ok(Self(value as u8))
        } else {
            Err(GuessError::OutOfRangeOrNotANumber(value.to_string()))
        }
    }

    /// Parses raw player input. Surrounding whitespace is ignored.
    #[instrument]
    pub fn parse(raw: &str) -> Result<Self, GuessError> {
        let trimmed = raw.trim();
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| GuessError::OutOfRangeOrNotANumber(trimmed.to_string()))?;
        Self::new(value).map_err(|_| GuessError::OutOfRangeOrNotANumber(trimmed.to_string()))
    }

    /// Returns the guessed number.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl FromStr for Guess {
    type Err = GuessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Error that can occur when validating or applying a guess.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GuessError {
    /// Input was not an integer between 1 and 100.
    #[display("'{}' is not a number between {} and {}", _0, MIN_NUMBER, MAX_NUMBER)]
    OutOfRangeOrNotANumber(String),

    /// The number was already guessed in this round.
    #[display("{} was already guessed", _0)]
    DuplicateGuess(Guess),

    /// The round is already won.
    #[display("Session is already complete")]
    SessionAlreadyComplete,

    /// The round has not been won yet, so there is no score.
    #[display("Session has not been won yet")]
    SessionNotWon,

    /// Player name was blank after trimming.
    #[display("Player name must not be empty")]
    InvalidPlayerName,

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for GuessError {}

impl GuessError {
    /// True for errors caused by player input, which leave the round untouched.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfRangeOrNotANumber(_) | Self::DuplicateGuess(_)
        )
    }
}
