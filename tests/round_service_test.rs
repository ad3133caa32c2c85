//! Tests for round completion, best-effort storage and champion tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use number_master::{
    GameSession, Guess, GuessError, MAX_NUMBER, MIN_NUMBER, MemoryScoreStore, NewScoreRecord,
    PlayerName, ReconcileStrategy, Reconciliation, RoundService, Score, ScoreLedger, ScoreRecord,
    ScoreStore, ScoreUpdate, StorageError, Target,
};

/// Delegates to a memory store until switched into failure mode.
#[derive(Debug, Default)]
struct FlakyStore {
    inner: MemoryScoreStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::new("store offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ScoreStore for FlakyStore {
    async fn find_by_player(
        &self,
        player: &PlayerName,
    ) -> Result<Option<ScoreRecord>, StorageError> {
        self.check()?;
        self.inner.find_by_player(player).await
    }

    async fn find_best_overall(&self) -> Result<Option<ScoreRecord>, StorageError> {
        self.check()?;
        self.inner.find_best_overall().await
    }

    async fn insert(&self, record: NewScoreRecord) -> Result<ScoreRecord, StorageError> {
        self.check()?;
        self.inner.insert(record).await
    }

    async fn update_by_player(
        &self,
        player: &PlayerName,
        update: ScoreUpdate,
    ) -> Result<(), StorageError> {
        self.check()?;
        self.inner.update_by_player(player, update).await
    }

    async fn upsert_if_better(
        &self,
        record: NewScoreRecord,
    ) -> Result<Reconciliation, StorageError> {
        self.check()?;
        self.inner.upsert_if_better(record).await
    }
}

/// Wins a session by guessing upward from the minimum.
fn win(session: &mut GameSession) {
    for n in MIN_NUMBER..=MAX_NUMBER {
        if session.submit_guess(&n.to_string()).expect("Fresh number").is_won() {
            return;
        }
    }
    panic!("Exhaustive search must win");
}

/// A session won on the first guess, `seconds` after it started.
fn won_in_one(name: &str, seconds: u64) -> GameSession {
    let start = Instant::now();
    let mut session = GameSession::with_target_at(
        PlayerName::new(name).expect("Valid name"),
        Target::new(Guess::new(42).expect("Valid target")),
        start,
    );
    session
        .submit_guess_at("42", start + Duration::from_secs(seconds))
        .expect("Valid guess");
    session
}

async fn seed(store: &Arc<MemoryScoreStore>, name: &str, attempts: u32, seconds: f64) {
    ScoreLedger::new(Arc::clone(store), ReconcileStrategy::default())
        .reconcile(&PlayerName::new(name).unwrap(), Score::new(attempts, seconds))
        .await
        .expect("Seed failed");
}

#[tokio::test]
async fn test_blank_name_rejected() {
    let service = RoundService::new(Arc::new(MemoryScoreStore::new()), ReconcileStrategy::default());
    assert_eq!(
        service.start_round("   ").err(),
        Some(GuessError::InvalidPlayerName)
    );
}

#[tokio::test]
async fn test_name_is_trimmed() {
    let service = RoundService::new(Arc::new(MemoryScoreStore::new()), ReconcileStrategy::default());
    let session = service.start_round("  Ann  ").expect("Valid name");
    assert_eq!(session.player().as_str(), "Ann");
}

#[tokio::test]
async fn test_complete_open_round_fails() {
    let service = RoundService::new(Arc::new(MemoryScoreStore::new()), ReconcileStrategy::default());
    let session = service.start_round("Ann").unwrap();
    assert_eq!(
        service.complete_round(&session).await.err(),
        Some(GuessError::SessionNotWon)
    );
}

#[tokio::test]
async fn test_first_win_becomes_champion() {
    let store = Arc::new(MemoryScoreStore::new());
    let service = RoundService::new(Arc::clone(&store), ReconcileStrategy::default());
    assert!(service.champion().await.is_none());

    let mut session = service.start_round("Ann").unwrap();
    win(&mut session);
    let report = service.complete_round(&session).await.expect("Round won");

    assert_eq!(*report.reconciliation(), Some(Reconciliation::Inserted));
    assert!(report.is_recorded());
    assert!(report.is_personal_best());
    assert!(report.is_champion());
    assert_eq!(
        service.champion().await.map(|c| c.player_name().clone()),
        Some("Ann".to_string())
    );
    assert!(service.is_existing_player("Ann").await.unwrap());
    assert!(!service.is_existing_player("  ").await.unwrap());
}

#[tokio::test]
async fn test_storage_failure_does_not_undo_win() {
    let store = Arc::new(FlakyStore::default());
    let service = RoundService::new(Arc::clone(&store), ReconcileStrategy::ConditionalUpsert);

    let mut session = service.start_round("Ann").unwrap();
    win(&mut session);
    store.fail(true);

    let report = service
        .complete_round(&session)
        .await
        .expect("Win stands despite storage failure");

    assert!(session.is_won());
    assert!(!report.is_recorded());
    assert!(report.storage_error().is_some());
    assert!(report.champion().is_none());
}

#[tokio::test]
async fn test_failed_refresh_keeps_last_champion() {
    let store = Arc::new(FlakyStore::default());
    let service = RoundService::new(Arc::clone(&store), ReconcileStrategy::ReadThenWrite);

    let mut first = service.start_round("Ann").unwrap();
    win(&mut first);
    service.complete_round(&first).await.unwrap();

    store.fail(true);
    let mut second = service.start_round("Bob").unwrap();
    win(&mut second);
    let report = service.complete_round(&second).await.unwrap();

    assert!(!report.is_recorded());
    assert_eq!(
        report.champion().as_ref().map(|c| c.player_name().as_str()),
        Some("Ann")
    );
}

#[tokio::test]
async fn test_player_record_lookup() {
    let service = RoundService::new(Arc::new(MemoryScoreStore::new()), ReconcileStrategy::default());
    assert!(service.player_record("Ann").await.unwrap().is_none());

    let mut session = service.start_round("Ann").unwrap();
    win(&mut session);
    let report = service.complete_round(&session).await.unwrap();

    let record = service.player_record(" Ann ").await.unwrap().expect("Recorded");
    assert_eq!(record.score(), *report.score());
}

#[tokio::test]
async fn test_unchanged_round_reports_stored_champion() {
    let store = Arc::new(MemoryScoreStore::new());
    seed(&store, "Ann", 1, 0.0).await;

    // Fresh service: the champion snapshot has never been fetched.
    let service = RoundService::new(Arc::clone(&store), ReconcileStrategy::default());
    let report = service
        .complete_round(&won_in_one("Ann", 5))
        .await
        .expect("Round won");

    assert_eq!(*report.reconciliation(), Some(Reconciliation::Unchanged));
    assert_eq!(
        report.champion().as_ref().map(|c| c.player_name().as_str()),
        Some("Ann")
    );
    assert!(report.is_champion());
}

#[tokio::test]
async fn test_updated_record_takes_over_champion() {
    let store = Arc::new(MemoryScoreStore::new());
    seed(&store, "Ann", 5, 30.0).await;
    seed(&store, "Bob", 6, 10.0).await;

    let service = RoundService::new(Arc::clone(&store), ReconcileStrategy::default());
    assert_eq!(
        service.champion().await.map(|c| c.player_name().clone()),
        Some("Ann".to_string())
    );

    let report = service
        .complete_round(&won_in_one("Bob", 5))
        .await
        .expect("Round won");

    assert_eq!(*report.reconciliation(), Some(Reconciliation::Updated));
    assert!(report.is_champion());
    let champion = service.champion().await.expect("Champion exists");
    assert_eq!(champion.player_name(), "Bob");
    assert_eq!(champion.score(), Score::new(1, 5.0));
}
