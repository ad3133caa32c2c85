//! Round orchestration: session start, completion and champion tracking.

use std::sync::Arc;

use derive_getters::Getters;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use crate::db::{ScoreRecord, ScoreStore, StorageError};
use crate::{
    GameSession, GuessError, LeaderboardQuery, PlayerName, Reconciliation, ReconcileStrategy,
    Score, ScoreLedger,
};

/// What happened to a won round after it left the game board.
#[derive(Debug, Clone, Getters)]
pub struct RoundReport {
    player: PlayerName,
    score: Score,
    reconciliation: Option<Reconciliation>,
    storage_error: Option<StorageError>,
    champion: Option<ScoreRecord>,
}

impl RoundReport {
    /// True when the result reached the store.
    pub fn is_recorded(&self) -> bool {
        self.reconciliation.is_some()
    }

    /// True when this round set a new personal best (or the first one).
    pub fn is_personal_best(&self) -> bool {
        self.reconciliation.is_some_and(Reconciliation::is_write)
    }

    /// True when the player now holds the global best.
    pub fn is_champion(&self) -> bool {
        self.champion
            .as_ref()
            .is_some_and(|c| c.player_name() == self.player.as_str())
    }
}

/// Service layer tying sessions, the ledger and the leaderboard together.
///
/// Storage is best effort: a failed write never undoes a win, it is logged
/// and surfaced in the [`RoundReport`].
#[derive(Debug)]
pub struct RoundService<S> {
    ledger: ScoreLedger<S>,
    leaderboard: LeaderboardQuery<S>,
    champion: RwLock<Option<ScoreRecord>>,
}

impl<S: ScoreStore> RoundService<S> {
    /// Creates a service over one shared store handle.
    #[instrument(skip(store))]
    pub fn new(store: Arc<S>, strategy: ReconcileStrategy) -> Self {
        info!("Creating RoundService");
        Self {
            ledger: ScoreLedger::new(Arc::clone(&store), strategy),
            leaderboard: LeaderboardQuery::new(store),
            champion: RwLock::new(None),
        }
    }

    /// Returns the underlying ledger.
    pub fn ledger(&self) -> &ScoreLedger<S> {
        &self.ledger
    }

    /// Returns the underlying leaderboard query.
    pub fn leaderboard(&self) -> &LeaderboardQuery<S> {
        &self.leaderboard
    }

    /// Starts a round for a raw player name.
    ///
    /// # Errors
    ///
    /// Returns [`GuessError::InvalidPlayerName`] for a blank name.
    #[instrument(skip(self))]
    pub fn start_round(&self, raw_name: &str) -> Result<GameSession, GuessError> {
        let player = PlayerName::new(raw_name)?;
        Ok(GameSession::new(player))
    }

    /// Reconciles a won session and refreshes the champion snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GuessError::SessionNotWon`] if the session is still open.
    /// Storage failures are reported in the returned [`RoundReport`].
    #[instrument(skip(self, session), fields(player = %session.player()))]
    pub async fn complete_round(&self, session: &GameSession) -> Result<RoundReport, GuessError> {
        let score = session.score().ok_or(GuessError::SessionNotWon)?;
        let player = session.player().clone();

        let (reconciliation, storage_error) = match self.ledger.reconcile(&player, score).await {
            Ok(outcome) => (Some(outcome), None),
            Err(e) => {
                error!(error = %e, "Failed to record score; win stands");
                (None, Some(e))
            }
        };

        let stale = reconciliation.is_none_or(LeaderboardQuery::<S>::needs_refresh);
        let champion = if stale {
            self.refresh_champion().await
        } else {
            debug!("Champion unaffected by this round");
            self.champion().await
        };

        Ok(RoundReport {
            player,
            score,
            reconciliation,
            storage_error,
            champion,
        })
    }

    /// The last champion snapshot, fetched on first use.
    #[instrument(skip(self))]
    pub async fn champion(&self) -> Option<ScoreRecord> {
        if let Some(champion) = self.champion.read().await.clone() {
            return Some(champion);
        }
        self.refresh_champion().await
    }

    /// Re-reads the champion from the store.
    ///
    /// On failure the previous snapshot is kept and returned.
    #[instrument(skip(self))]
    pub async fn refresh_champion(&self) -> Option<ScoreRecord> {
        match self.leaderboard.best_overall().await {
            Ok(best) => {
                let mut snapshot = self.champion.write().await;
                snapshot.clone_from(&best);
                best
            }
            Err(e) => {
                error!(error = %e, "Failed to refresh champion; keeping last snapshot");
                self.champion.read().await.clone()
            }
        }
    }

    /// Whether a name already has a record. Blank names never do.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    #[instrument(skip(self))]
    pub async fn is_existing_player(&self, raw_name: &str) -> Result<bool, StorageError> {
        match PlayerName::new(raw_name) {
            Ok(player) => self.leaderboard.is_existing_player(&player).await,
            Err(_) => Ok(false),
        }
    }

    /// The stored record for a name. Blank names have none.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    #[instrument(skip(self))]
    pub async fn player_record(&self, raw_name: &str) -> Result<Option<ScoreRecord>, StorageError> {
        match PlayerName::new(raw_name) {
            Ok(player) => self.leaderboard.player_record(&player).await,
            Err(_) => Ok(None),
        }
    }
}
