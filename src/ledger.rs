//! Score reconciliation: the only writer of score records.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::db::{NewScoreRecord, ScoreStore, StorageError};
use crate::{PlayerName, RankingPolicy, Score};

/// What reconciliation did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Reconciliation {
    /// First completed round for this player; a record was created.
    #[display("inserted")]
    Inserted,
    /// The round beat the player's record, which was overwritten.
    #[display("updated")]
    Updated,
    /// The round did not beat the record; nothing was written.
    #[display("unchanged")]
    Unchanged,
}

impl Reconciliation {
    /// True when the store changed.
    pub fn is_write(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// How the ledger talks to the store.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReconcileStrategy {
    /// Find the record, then insert or update from the client.
    ///
    /// The read and the write are separate store calls. Two rounds for the
    /// same player finishing at once can interleave, and the worse result
    /// may overwrite the better one. Acceptable only when one round per
    /// player runs at a time.
    ReadThenWrite,
    /// Hand the score to the store, which compares and writes atomically.
    #[default]
    ConditionalUpsert,
}

/// Decides whether a completed round replaces a player's stored record.
#[derive(Debug)]
pub struct ScoreLedger<S> {
    store: Arc<S>,
    strategy: ReconcileStrategy,
}

impl<S> Clone for ScoreLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            strategy: self.strategy,
        }
    }
}

impl<S: ScoreStore> ScoreLedger<S> {
    /// Creates a ledger over an explicitly passed store handle.
    #[instrument(skip(store))]
    pub fn new(store: Arc<S>, strategy: ReconcileStrategy) -> Self {
        info!(%strategy, "Creating ScoreLedger");
        Self { store, strategy }
    }

    /// The strategy in use.
    pub fn strategy(&self) -> ReconcileStrategy {
        self.strategy
    }

    /// Reconciles a won round's score with the player's stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails. The store is left as the
    /// failing call found it.
    #[instrument(skip(self), fields(player = %player, strategy = %self.strategy))]
    pub async fn reconcile(
        &self,
        player: &PlayerName,
        score: Score,
    ) -> Result<Reconciliation, StorageError> {
        let record = NewScoreRecord::from_score(player, score, Utc::now().naive_utc());

        let outcome = match self.strategy {
            ReconcileStrategy::ReadThenWrite => self.read_then_write(player, record).await?,
            ReconcileStrategy::ConditionalUpsert => self.store.upsert_if_better(record).await?,
        };

        info!(%outcome, %score, "Score reconciled");
        Ok(outcome)
    }

    async fn read_then_write(
        &self,
        player: &PlayerName,
        record: NewScoreRecord,
    ) -> Result<Reconciliation, StorageError> {
        let Some(existing) = self.store.find_by_player(player).await? else {
            debug!("No prior record");
            self.store.insert(record).await?;
            return Ok(Reconciliation::Inserted);
        };

        if RankingPolicy::is_better(&record.score(), &existing.score()) {
            debug!(previous = %existing.score(), "New personal best");
            self.store
                .update_by_player(player, record.as_update())
                .await?;
            Ok(Reconciliation::Updated)
        } else {
            debug!(kept = %existing.score(), "Stored record is at least as good");
            Ok(Reconciliation::Unchanged)
        }
    }
}
