//! Contract-based validation for guesses.
//!
//! Contracts define correctness through preconditions and postconditions:
//! {P} guess {Q}

use super::action::{Guess, GuessError};
use super::invariants::{GuessHistory, InvariantSet, RoundInvariants};
use super::typestate::{RoundInProgress, RoundResult};
use tracing::instrument;

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// State produced by the transition.
    type Output;

    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), GuessError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &Self::Output) -> Result<(), GuessError>;
}

/// Precondition: the number has not been guessed yet this round.
pub struct NotYetGuessed;

impl NotYetGuessed {
    /// Fails with [`GuessError::DuplicateGuess`] on a repeat.
    #[instrument(skip(round))]
    pub fn check(guess: &Guess, round: &RoundInProgress) -> Result<(), GuessError> {
        if round.history().iter().any(|e| e.number == *guess) {
            Err(GuessError::DuplicateGuess(*guess))
        } else {
            Ok(())
        }
    }
}

/// Contract for guess actions.
///
/// Preconditions:
/// - Number not guessed before (range is guaranteed by [`Guess`])
///
/// Postconditions:
/// - History grew by exactly one entry, at the head
/// - Round invariants hold
pub struct GuessContract;

impl Contract<RoundInProgress, Guess> for GuessContract {
    type Output = RoundResult;

    fn pre(round: &RoundInProgress, guess: &Guess) -> Result<(), GuessError> {
        NotYetGuessed::check(guess, round)
    }

    fn post(before: &RoundInProgress, after: &RoundResult) -> Result<(), GuessError> {
        if after.history().len() != before.history().len() + 1
            || after.history().get(1..) != Some(before.history())
        {
            return Err(GuessError::InvariantViolation(
                "Postcondition failed: history must grow by one entry at the head".to_string(),
            ));
        }

        RoundInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            GuessError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}
