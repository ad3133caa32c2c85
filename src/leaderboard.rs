//! Read-only views over the score store.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::db::{ScoreRecord, ScoreStore, StorageError};
use crate::{PlayerName, Reconciliation};

/// Derives the global champion and answers per-player lookups.
#[derive(Debug)]
pub struct LeaderboardQuery<S> {
    store: Arc<S>,
}

impl<S> Clone for LeaderboardQuery<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ScoreStore> LeaderboardQuery<S> {
    /// Creates a query over an explicitly passed store handle.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The record with the fewest attempts, then the lowest time.
    /// `None` when nobody has finished a round yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    #[instrument(skip(self))]
    pub async fn best_overall(&self) -> Result<Option<ScoreRecord>, StorageError> {
        let best = self.store.find_best_overall().await?;
        debug!(champion = ?best.as_ref().map(|r| r.player_name()), "Champion fetched");
        Ok(best)
    }

    /// The stored record for a player, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    #[instrument(skip(self), fields(player = %player))]
    pub async fn player_record(
        &self,
        player: &PlayerName,
    ) -> Result<Option<ScoreRecord>, StorageError> {
        self.store.find_by_player(player).await
    }

    /// True when the player already has a record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    pub async fn is_existing_player(&self, player: &PlayerName) -> Result<bool, StorageError> {
        Ok(self.player_record(player).await?.is_some())
    }

    /// True when a reconciliation outcome may have changed the champion.
    pub fn needs_refresh(outcome: Reconciliation) -> bool {
        outcome.is_write()
    }
}
