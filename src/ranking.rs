//! Ranking policy: the single definition of a "better" result.
//!
//! Fewer attempts always wins. Equal attempts fall back to the lower time.
//! Equal on both is a tie, and a tie is never better. The ledger and the
//! in-memory store rank through [`RankingPolicy::compare`]; the SQL
//! `ORDER BY attempts, time_seconds` matches it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;
use tracing::instrument;

/// Result of a won round: attempts taken and wall-clock seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    attempts: u32,
    time_seconds: f64,
}

impl Score {
    /// Creates a score, rounding the time to two decimals.
    ///
    /// Negative or non-finite times are stored as zero.
    #[instrument]
    pub fn new(attempts: u32, time_seconds: f64) -> Self {
        Self {
            attempts,
            time_seconds: round_centis(time_seconds),
        }
    }

    /// Creates a score from the elapsed duration of a round.
    pub fn from_elapsed(attempts: u32, elapsed: Duration) -> Self {
        Self::new(attempts, elapsed.as_secs_f64())
    }

    /// Number of guesses taken, including the winning one.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Round duration in seconds, two decimal places.
    pub fn time_seconds(&self) -> f64 {
        self.time_seconds
    }

    /// Total order under the ranking policy. `Less` means `self` ranks higher.
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        RankingPolicy::compare(self, other)
    }

    /// True when `self` strictly beats `other`.
    pub fn is_better_than(&self, other: &Self) -> bool {
        RankingPolicy::is_better(self, other)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} attempts in {:.2}s", self.attempts, self.time_seconds)
    }
}

fn round_centis(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 100.0).round() / 100.0
    } else {
        0.0
    }
}

/// Comparison rules shared by reconciliation and the global leaderboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingPolicy;

impl RankingPolicy {
    /// Orders by attempts ascending, then time ascending.
    pub fn compare(a: &Score, b: &Score) -> Ordering {
        a.attempts
            .cmp(&b.attempts)
            .then_with(|| a.time_seconds.total_cmp(&b.time_seconds))
    }

    /// True when `candidate` strictly beats `incumbent`.
    #[instrument]
    pub fn is_better(candidate: &Score, incumbent: &Score) -> bool {
        Self::compare(candidate, incumbent) == Ordering::Less
    }
}
