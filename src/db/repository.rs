//! SQLite repository for score records.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{NewScoreRecord, ScoreRecord, ScoreUpdate, StorageError, schema};
use crate::{PlayerName, Reconciliation, RankingPolicy};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database repository for score records.
///
/// Opens a fresh connection per operation, so clones are cheap and can be
/// moved onto blocking worker threads. The `*_blocking` methods run diesel
/// on the calling thread; async callers go through [`crate::ScoreStore`].
#[derive(Debug, Clone)]
pub struct ScoreRepository {
    db_path: String,
}

impl ScoreRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, StorageError> {
        if db_path.trim().is_empty() {
            return Err(StorageError::new("Database path must not be empty"));
        }
        info!(path = %db_path, "Creating ScoreRepository");
        Ok(Self { db_path })
    }

    /// Creates the repository and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StorageError> {
        let repo = Self::new(db_path)?;
        repo.run_migrations()?;
        Ok(repo)
    }

    /// Path of the backing database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StorageError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            StorageError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })?;
        // Writers queue on the lock instead of failing with SQLITE_BUSY.
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))?;
        Ok(conn)
    }

    /// Applies embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), StorageError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StorageError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Gets the record for a player. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a database error occurs.
    #[instrument(skip(self), fields(player = %player))]
    pub fn find_by_player_blocking(
        &self,
        player: &PlayerName,
    ) -> Result<Option<ScoreRecord>, StorageError> {
        debug!("Looking up record by player");
        let mut conn = self.connection()?;
        find_by_player(&mut conn, player)
    }

    /// Gets the record with the fewest attempts, then the lowest time.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_best_overall_blocking(&self) -> Result<Option<ScoreRecord>, StorageError> {
        use schema::score_records::dsl;

        let mut conn = self.connection()?;
        let best = dsl::score_records
            .order((dsl::attempts.asc(), dsl::time_seconds.asc(), dsl::id.asc()))
            .select(ScoreRecord::as_select())
            .first(&mut conn)
            .optional()?;

        match &best {
            Some(record) => debug!(player = %record.player_name(), "Champion found"),
            None => debug!("No records yet"),
        }
        Ok(best)
    }

    /// Inserts a record for a player with no prior record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the name is taken or a database error occurs.
    #[instrument(skip(self, record), fields(player = %record.player_name()))]
    pub fn insert_blocking(&self, record: NewScoreRecord) -> Result<ScoreRecord, StorageError> {
        let mut conn = self.connection()?;
        let inserted = insert(&mut conn, &record)?;
        info!(record_id = inserted.id(), "Score record inserted");
        Ok(inserted)
    }

    /// Replaces the result fields of a player's record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if no record exists or a database error occurs.
    #[instrument(skip(self, update), fields(player = %player))]
    pub fn update_by_player_blocking(
        &self,
        player: &PlayerName,
        update: ScoreUpdate,
    ) -> Result<(), StorageError> {
        let mut conn = self.connection()?;
        update_by_player(&mut conn, player, &update)?;
        info!("Score record updated");
        Ok(())
    }

    /// Inserts or improves a player's record in one immediate transaction.
    ///
    /// The betterness check runs while the write lock is held, so two
    /// concurrent completions for the same player cannot lose an update.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a database error occurs.
    #[instrument(skip(self, record), fields(player = %record.player_name()))]
    pub fn upsert_if_better_blocking(
        &self,
        record: NewScoreRecord,
    ) -> Result<Reconciliation, StorageError> {
        let mut conn = self.connection()?;
        let player = PlayerName::new(record.player_name())
            .map_err(|e| StorageError::new(e.to_string()))?;

        let outcome = conn.immediate_transaction::<_, StorageError, _>(|conn| {
            match find_by_player(conn, &player)? {
                None => {
                    insert(conn, &record)?;
                    Ok(Reconciliation::Inserted)
                }
                Some(existing) if RankingPolicy::is_better(&record.score(), &existing.score()) => {
                    update_by_player(conn, &player, &record.as_update())?;
                    Ok(Reconciliation::Updated)
                }
                Some(_) => Ok(Reconciliation::Unchanged),
            }
        })?;

        info!(%outcome, "Conditional upsert committed");
        Ok(outcome)
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count(&self) -> Result<i64, StorageError> {
        let mut conn = self.connection()?;
        let count = schema::score_records::table.count().get_result(&mut conn)?;
        Ok(count)
    }
}

fn find_by_player(
    conn: &mut SqliteConnection,
    player: &PlayerName,
) -> Result<Option<ScoreRecord>, StorageError> {
    use schema::score_records::dsl;

    let record = dsl::score_records
        .filter(dsl::player_name.eq(player.as_str()))
        .select(ScoreRecord::as_select())
        .first(conn)
        .optional()?;
    Ok(record)
}

fn insert(conn: &mut SqliteConnection, record: &NewScoreRecord) -> Result<ScoreRecord, StorageError> {
    let inserted = diesel::insert_into(schema::score_records::table)
        .values(record)
        .returning(ScoreRecord::as_returning())
        .get_result(conn)?;
    Ok(inserted)
}

fn update_by_player(
    conn: &mut SqliteConnection,
    player: &PlayerName,
    update: &ScoreUpdate,
) -> Result<(), StorageError> {
    use schema::score_records::dsl;

    let rows = diesel::update(dsl::score_records.filter(dsl::player_name.eq(player.as_str())))
        .set(update)
        .execute(conn)?;

    if rows == 0 {
        return Err(StorageError::new(format!("No record for player '{}'", player)));
    }
    Ok(())
}
