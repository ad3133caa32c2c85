//! Abstract persistent store used by the ledger and the leaderboard.

use tokio::task::spawn_blocking;
use tracing::{debug, instrument};

use crate::db::{NewScoreRecord, ScoreRecord, ScoreRepository, ScoreUpdate, StorageError};
use crate::{PlayerName, Reconciliation};

/// Operations the core needs from a score backend.
///
/// Every call may suspend. The store does not promise atomicity across
/// calls, only within [`ScoreStore::upsert_if_better`].
#[async_trait::async_trait]
pub trait ScoreStore: Send + Sync {
    /// Record for an exact (trimmed) player name.
    async fn find_by_player(&self, player: &PlayerName)
    -> Result<Option<ScoreRecord>, StorageError>;

    /// Record with the fewest attempts, then the lowest time.
    async fn find_best_overall(&self) -> Result<Option<ScoreRecord>, StorageError>;

    /// Inserts a record for a player that has none.
    async fn insert(&self, record: NewScoreRecord) -> Result<ScoreRecord, StorageError>;

    /// Replaces attempts, time and timestamp of a player's record.
    async fn update_by_player(
        &self,
        player: &PlayerName,
        update: ScoreUpdate,
    ) -> Result<(), StorageError>;

    /// Inserts or improves a record with the betterness check evaluated
    /// inside the store, as one atomic step.
    async fn upsert_if_better(&self, record: NewScoreRecord)
    -> Result<Reconciliation, StorageError>;
}

#[async_trait::async_trait]
impl ScoreStore for ScoreRepository {
    #[instrument(skip(self), fields(player = %player))]
    async fn find_by_player(
        &self,
        player: &PlayerName,
    ) -> Result<Option<ScoreRecord>, StorageError> {
        let repo = self.clone();
        let player = player.clone();
        spawn_blocking(move || repo.find_by_player_blocking(&player)).await?
    }

    #[instrument(skip(self))]
    async fn find_best_overall(&self) -> Result<Option<ScoreRecord>, StorageError> {
        let repo = self.clone();
        spawn_blocking(move || repo.find_best_overall_blocking()).await?
    }

    #[instrument(skip(self, record))]
    async fn insert(&self, record: NewScoreRecord) -> Result<ScoreRecord, StorageError> {
        let repo = self.clone();
        spawn_blocking(move || repo.insert_blocking(record)).await?
    }

    #[instrument(skip(self, update), fields(player = %player))]
    async fn update_by_player(
        &self,
        player: &PlayerName,
        update: ScoreUpdate,
    ) -> Result<(), StorageError> {
        let repo = self.clone();
        let player = player.clone();
        spawn_blocking(move || repo.update_by_player_blocking(&player, update)).await?
    }

    #[instrument(skip(self, record))]
    async fn upsert_if_better(
        &self,
        record: NewScoreRecord,
    ) -> Result<Reconciliation, StorageError> {
        debug!("Dispatching conditional upsert to blocking pool");
        let repo = self.clone();
        spawn_blocking(move || repo.upsert_if_better_blocking(record)).await?
    }
}
