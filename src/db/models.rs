//! Database models and domain types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use crate::db::schema;
use crate::{PlayerName, Score};

/// Best result stored for one player.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable, Getters, new)]
#[diesel(table_name = schema::score_records)]
pub struct ScoreRecord {
    id: i32,
    player_name: String,
    attempts: i32,
    time_seconds: f64,
    created_at: NaiveDateTime,
}

impl ScoreRecord {
    /// The stored result as a rankable [`Score`].
    pub fn score(&self) -> Score {
        Score::new(u32::try_from(self.attempts).unwrap_or(0), self.time_seconds)
    }

    /// Overwrites the result fields. The name and id never change.
    #[instrument(skip(self, update), fields(player = %self.player_name))]
    pub fn apply(&mut self, update: &ScoreUpdate) {
        self.attempts = update.attempts;
        self.time_seconds = update.time_seconds;
        self.created_at = update.created_at;
    }
}

impl std::fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.player_name, self.score())
    }
}

/// Insertable record for a player's first completed round.
#[derive(Debug, Clone, PartialEq, Insertable, Getters)]
#[diesel(table_name = schema::score_records)]
pub struct NewScoreRecord {
    player_name: String,
    attempts: i32,
    time_seconds: f64,
    created_at: NaiveDateTime,
}

impl NewScoreRecord {
    /// Builds a record for `player` written at `at`.
    #[instrument(skip(player), fields(player = %player))]
    pub fn from_score(player: &PlayerName, score: Score, at: NaiveDateTime) -> Self {
        Self {
            player_name: player.as_str().to_string(),
            attempts: i32::try_from(score.attempts()).unwrap_or(i32::MAX),
            time_seconds: score.time_seconds(),
            created_at: at,
        }
    }

    /// The result being written.
    pub fn score(&self) -> Score {
        Score::new(u32::try_from(self.attempts).unwrap_or(0), self.time_seconds)
    }

    /// The same result as an update of an existing row.
    pub fn as_update(&self) -> ScoreUpdate {
        ScoreUpdate {
            attempts: self.attempts,
            time_seconds: self.time_seconds,
            created_at: self.created_at,
        }
    }
}

/// Fields replaced when a player beats their own record.
#[derive(Debug, Clone, Copy, PartialEq, AsChangeset, Getters)]
#[diesel(table_name = schema::score_records)]
pub struct ScoreUpdate {
    attempts: i32,
    time_seconds: f64,
    created_at: NaiveDateTime,
}
