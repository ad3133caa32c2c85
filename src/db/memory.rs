//! In-memory score store for tests and throwaway sessions.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::db::{NewScoreRecord, ScoreRecord, ScoreStore, ScoreUpdate, StorageError};
use crate::{PlayerName, RankingPolicy, Reconciliation};

#[derive(Debug, Default)]
struct Table {
    rows: HashMap<String, ScoreRecord>,
    next_id: i32,
}

impl Table {
    fn insert(&mut self, record: NewScoreRecord) -> Result<ScoreRecord, StorageError> {
        if self.rows.contains_key(record.player_name()) {
            return Err(StorageError::new(format!(
                "UNIQUE constraint failed: score_records.player_name ('{}')",
                record.player_name()
            )));
        }
        self.next_id += 1;
        let row = ScoreRecord::new(
            self.next_id,
            record.player_name().clone(),
            *record.attempts(),
            *record.time_seconds(),
            *record.created_at(),
        );
        self.rows.insert(row.player_name().clone(), row.clone());
        Ok(row)
    }

    fn update(&mut self, player: &PlayerName, update: &ScoreUpdate) -> Result<(), StorageError> {
        match self.rows.get_mut(player.as_str()) {
            Some(row) => {
                row.apply(update);
                Ok(())
            }
            None => Err(StorageError::new(format!("No record for player '{}'", player))),
        }
    }
}

/// Score store held in process memory. Every operation runs under one lock.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    table: Mutex<Table>,
}

impl MemoryScoreStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating MemoryScoreStore");
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    /// True when nothing has been stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl ScoreStore for MemoryScoreStore {
    #[instrument(skip(self), fields(player = %player))]
    async fn find_by_player(
        &self,
        player: &PlayerName,
    ) -> Result<Option<ScoreRecord>, StorageError> {
        Ok(self.table.lock().await.rows.get(player.as_str()).cloned())
    }

    #[instrument(skip(self))]
    async fn find_best_overall(&self) -> Result<Option<ScoreRecord>, StorageError> {
        let table = self.table.lock().await;
        let best = table
            .rows
            .values()
            .min_by(|a, b| {
                RankingPolicy::compare(&a.score(), &b.score()).then_with(|| a.id().cmp(b.id()))
            })
            .cloned();
        debug!(found = best.is_some(), "Best overall computed");
        Ok(best)
    }

    #[instrument(skip(self, record), fields(player = %record.player_name()))]
    async fn insert(&self, record: NewScoreRecord) -> Result<ScoreRecord, StorageError> {
        self.table.lock().await.insert(record)
    }

    #[instrument(skip(self, update), fields(player = %player))]
    async fn update_by_player(
        &self,
        player: &PlayerName,
        update: ScoreUpdate,
    ) -> Result<(), StorageError> {
        self.table.lock().await.update(player, &update)
    }

    #[instrument(skip(self, record), fields(player = %record.player_name()))]
    async fn upsert_if_better(
        &self,
        record: NewScoreRecord,
    ) -> Result<Reconciliation, StorageError> {
        let mut table = self.table.lock().await;
        let existing = table.rows.get(record.player_name()).map(ScoreRecord::score);

        match existing {
            None => {
                table.insert(record)?;
                Ok(Reconciliation::Inserted)
            }
            Some(stored) if RankingPolicy::is_better(&record.score(), &stored) => {
                let player = PlayerName::new(record.player_name())
                    .map_err(|e| StorageError::new(e.to_string()))?;
                table.update(&player, &record.as_update())?;
                Ok(Reconciliation::Updated)
            }
            Some(_) => Ok(Reconciliation::Unchanged),
        }
    }
}
