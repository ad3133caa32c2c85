//! Runtime session wrapper for typestate phases.
//!
//! Presentation code holds one [`GameSession`] per round and feeds it raw
//! input. The wrapper owns the phase switch so callers never juggle the
//! typestate values themselves.

use super::action::{Guess, GuessError};
use super::invariants::GuessHistory;
use super::types::{GuessEntry, PlayerName, Target};
use super::typestate::{RoundInProgress, RoundResult, RoundSetup, RoundWon};
use crate::ranking::Score;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Lifecycle event consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A round began for the player.
    Started {
        /// Who is playing.
        player: PlayerName,
    },
    /// A guess was classified and recorded.
    Guessed(GuessEntry),
    /// The target was found.
    Won {
        /// Final score of the round.
        score: Score,
    },
}

/// What a successful `submit_guess` produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessOutcome {
    entry: GuessEntry,
    score: Option<Score>,
}

impl GuessOutcome {
    /// The recorded entry.
    pub fn entry(&self) -> &GuessEntry {
        &self.entry
    }

    /// The final score, present only for the winning guess.
    pub fn score(&self) -> Option<Score> {
        self.score
    }

    /// True when this guess won the round.
    pub fn is_won(&self) -> bool {
        self.score.is_some()
    }

    /// Events emitted by this guess: `Guessed`, then `Won` on a win.
    pub fn events(&self) -> Vec<SessionEvent> {
        let mut events = vec![SessionEvent::Guessed(self.entry)];
        if let Some(score) = self.score {
            events.push(SessionEvent::Won { score });
        }
        events
    }
}

#[derive(Debug, Clone)]
enum Phase {
    AwaitingGuess(RoundInProgress),
    Won(RoundWon),
}

/// One player's round: `AWAITING_GUESS` until the target is found, then `WON`.
#[derive(Debug, Clone)]
pub struct GameSession {
    player: PlayerName,
    phase: Phase,
}

impl GameSession {
    /// Starts a round with a random target.
    #[instrument(skip(player), fields(player = %player))]
    pub fn new(player: PlayerName) -> Self {
        Self::from_setup(player, RoundSetup::new(), Instant::now())
    }

    /// Starts a round with a known target.
    pub fn with_target(player: PlayerName, target: Target) -> Self {
        Self::from_setup(player, RoundSetup::with_target(target), Instant::now())
    }

    /// Starts a round with a known target and start instant.
    pub fn with_target_at(player: PlayerName, target: Target, started_at: Instant) -> Self {
        Self::from_setup(player, RoundSetup::with_target(target), started_at)
    }

    fn from_setup(player: PlayerName, setup: RoundSetup, started_at: Instant) -> Self {
        info!(player = %player, "Session started");
        Self {
            player,
            phase: Phase::AwaitingGuess(setup.start_at(started_at)),
        }
    }

    /// Event announcing this session.
    pub fn started_event(&self) -> SessionEvent {
        SessionEvent::Started {
            player: self.player.clone(),
        }
    }

    /// Submits raw player input, timed now.
    pub fn submit_guess(&mut self, raw_input: &str) -> Result<GuessOutcome, GuessError> {
        self.submit_guess_at(raw_input, Instant::now())
    }

    /// Submits raw player input made at `at`.
    ///
    /// Rejected input leaves the session untouched.
    #[instrument(skip(self), fields(player = %self.player))]
    pub fn submit_guess_at(
        &mut self,
        raw_input: &str,
        at: Instant,
    ) -> Result<GuessOutcome, GuessError> {
        let round = match &self.phase {
            Phase::AwaitingGuess(round) => round,
            Phase::Won(_) => {
                warn!("Guess submitted after the round was won");
                return Err(GuessError::SessionAlreadyComplete);
            }
        };

        let guess = Guess::parse(raw_input).inspect_err(|e| warn!(error = %e, "Invalid input"))?;

        match round.clone().guess_at(guess, at) {
            Ok(RoundResult::InProgress(next)) => {
                let entry = next.history()[0];
                self.phase = Phase::AwaitingGuess(next);
                Ok(GuessOutcome { entry, score: None })
            }
            Ok(RoundResult::Won(won)) => {
                let entry = won.history()[0];
                let score = won.score();
                info!(%score, "Session won");
                self.phase = Phase::Won(won);
                Ok(GuessOutcome {
                    entry,
                    score: Some(score),
                })
            }
            Err(rejected) => {
                warn!(error = %rejected.error(), "Guess rejected");
                Err(rejected.into_error())
            }
        }
    }

    /// The player of this round.
    pub fn player(&self) -> &PlayerName {
        &self.player
    }

    /// True once the target was found.
    pub fn is_won(&self) -> bool {
        matches!(self.phase, Phase::Won(_))
    }

    /// Guess history, most recent first.
    pub fn history(&self) -> &[GuessEntry] {
        match &self.phase {
            Phase::AwaitingGuess(r) => r.history(),
            Phase::Won(r) => r.history(),
        }
    }

    /// Number of guesses recorded so far.
    pub fn attempts(&self) -> usize {
        self.history().len()
    }

    /// Final score, once won.
    pub fn score(&self) -> Option<Score> {
        match &self.phase {
            Phase::AwaitingGuess(_) => None,
            Phase::Won(r) => Some(r.score()),
        }
    }

    /// The target, revealed only after the win.
    pub fn revealed_target(&self) -> Option<Target> {
        match &self.phase {
            Phase::AwaitingGuess(_) => None,
            Phase::Won(r) => Some(r.target()),
        }
    }

    /// Running whole-second counter for display. Frozen once won.
    pub fn elapsed_whole_seconds(&self, now: Instant) -> u64 {
        match &self.phase {
            Phase::AwaitingGuess(r) => r.elapsed_whole_seconds(now),
            Phase::Won(r) => r.elapsed_whole_seconds(),
        }
    }

    /// Gives up on the round. Nothing is written anywhere.
    #[instrument(skip(self), fields(player = %self.player, attempts = self.attempts()))]
    pub fn abandon(self) {
        if self.is_won() {
            info!("Won session closed");
        } else {
            info!("Session abandoned before the target was found");
        }
    }
}

impl GuessHistory for GameSession {
    fn history(&self) -> &[GuessEntry] {
        GameSession::history(self)
    }

    fn is_won(&self) -> bool {
        GameSession::is_won(self)
    }
}
