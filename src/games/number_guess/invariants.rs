//! First-class invariants for a guessing round.
//!
//! Invariants are logical properties that must hold throughout a round.
//! They are testable independently and are checked as postconditions in
//! debug builds.

use super::types::{GuessEntry, GuessResult, MAX_NUMBER, MIN_NUMBER};
use std::collections::HashSet;
use tracing::warn;

/// Read access to a round's guess history, shared by every phase.
pub trait GuessHistory {
    /// Recorded guesses, most recent first.
    fn history(&self) -> &[GuessEntry];

    /// True once the target has been found.
    fn is_won(&self) -> bool;
}

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }
        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }
        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Every recorded number lies in the playable range.
pub struct GuessesInRange;

impl<S: GuessHistory> Invariant<S> for GuessesInRange {
    fn holds(state: &S) -> bool {
        let valid = state
            .history()
            .iter()
            .all(|e| (MIN_NUMBER..=MAX_NUMBER).contains(&e.number.value()));
        if !valid {
            warn!("Recorded guess outside playable range");
        }
        valid
    }

    fn description() -> &'static str {
        "Every recorded guess lies between 1 and 100"
    }
}

/// No number appears twice in the history.
pub struct NoDuplicateGuesses;

impl<S: GuessHistory> Invariant<S> for NoDuplicateGuesses {
    fn holds(state: &S) -> bool {
        let mut seen = HashSet::new();
        let valid = state.history().iter().all(|e| seen.insert(e.number));
        if !valid {
            warn!("Duplicate guess recorded");
        }
        valid
    }

    fn description() -> &'static str {
        "No number is recorded twice"
    }
}

/// A won round has exactly one correct entry, at the head. An open round has none.
pub struct HistoryConsistent;

impl<S: GuessHistory> Invariant<S> for HistoryConsistent {
    fn holds(state: &S) -> bool {
        let history = state.history();
        let correct = history
            .iter()
            .filter(|e| e.result == GuessResult::Correct)
            .count();

        let valid = if state.is_won() {
            correct == 1 && history.first().map(|e| e.result) == Some(GuessResult::Correct)
        } else {
            correct == 0
        };
        if !valid {
            warn!(correct, won = state.is_won(), "History inconsistent with phase");
        }
        valid
    }

    fn description() -> &'static str {
        "Correct guess appears once, at the head, only in a won round"
    }
}

/// All invariants of a guessing round.
pub type RoundInvariants = (GuessesInRange, NoDuplicateGuesses, HistoryConsistent);
