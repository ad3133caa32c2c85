mod action;
mod contracts;
mod invariants;
mod types;
mod typestate;
mod wrapper;

pub use action::{Guess, GuessError};
pub use contracts::{Contract, GuessContract, NotYetGuessed};
pub use invariants::{
    GuessHistory, GuessesInRange, HistoryConsistent, Invariant, InvariantSet, InvariantViolation,
    NoDuplicateGuesses, RoundInvariants,
};
pub use types::{GuessEntry, GuessResult, MAX_NUMBER, MIN_NUMBER, PlayerName, Target};
pub use typestate::{Rejected, RoundInProgress, RoundResult, RoundSetup, RoundWon};
pub use wrapper::{GameSession, GuessOutcome, SessionEvent};
