// crates/roster-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Record Store
// Description: Durable RecordStore backed by SQLite WAL.
// Purpose: Persist user records with store-assigned identity and timestamps.
// Dependencies: roster-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`RecordStore`] using `SQLite`. A single
//! connection behind a mutex serializes all writes; the `users` table owns
//! identifier assignment (`AUTOINCREMENT`, so identifiers are never reused)
//! and the store stamps `created_at` at insert time. Loads fail closed on
//! schema version mismatches and on rows that violate the data model.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use roster_core::RecordId;
use roster_core::RecordStore;
use roster_core::StoreError;
use roster_core::Timestamp;
use roster_core::UserDraft;
use roster_core::UserRecord;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Marker `SQLite` reports when the email uniqueness constraint fires.
const EMAIL_UNIQUE_MARKER: &str = "UNIQUE constraint failed: users.email";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` record store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a configuration with defaults for the provided path.
    #[must_use]
    pub fn for_path(path: PathBuf) -> Self {
        Self {
            path,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding full row payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or impossible row data.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// A uniqueness constraint was violated.
    #[error("sqlite store constraint violation: {0}")]
    Constraint(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Constraint(message) => Self::Constraint(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed record store with WAL support.
///
/// # Invariants
/// - All connection access is serialized through a mutex (single writer).
/// - `id` and `created_at` are assigned here and never accepted from callers.
#[derive(Clone)]
pub struct SqliteRecordStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Opens an `SQLite`-backed record store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or when an existing file carries an unsupported schema
    /// version.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the connection, normalizing mutex poisoning into a db error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }
}

impl RecordStore for SqliteRecordStore {
    fn insert(&self, draft: &UserDraft) -> Result<UserRecord, StoreError> {
        self.insert_record(draft).map_err(StoreError::from)
    }

    fn list_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.list_records().map_err(StoreError::from)
    }

    fn get_by_id(&self, id: RecordId) -> Result<Option<UserRecord>, StoreError> {
        self.load_record(id).map_err(StoreError::from)
    }

    fn update(&self, id: RecordId, draft: &UserDraft) -> Result<bool, StoreError> {
        self.update_record(id, draft).map_err(StoreError::from)
    }

    fn delete_by_id(&self, id: RecordId) -> Result<bool, StoreError> {
        self.delete_record(id).map_err(StoreError::from)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        let guard = self.lock()?;
        guard
            .query_row("SELECT 1", params![], |row| row.get::<_, i64>(0))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }
}

impl SqliteRecordStore {
    /// Inserts a draft and returns the persisted record.
    fn insert_record(&self, draft: &UserDraft) -> Result<UserRecord, SqliteStoreError> {
        let created_at = unix_millis();
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO users (name, email, age, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![draft.name, draft.email, draft.age, created_at],
            )
            .map_err(|err| map_constraint_error(&err, &draft.email))?;
        let raw_id = guard.last_insert_rowid();
        drop(guard);
        let id = RecordId::from_raw(raw_id)
            .ok_or_else(|| SqliteStoreError::Corrupt(format!("non-positive rowid: {raw_id}")))?;
        Ok(UserRecord {
            id,
            name: draft.name.clone(),
            email: draft.email.clone(),
            age: draft.age,
            created_at: Timestamp::from_unix_millis(created_at),
        })
    }

    /// Lists all records, newest first.
    fn list_records(&self) -> Result<Vec<UserRecord>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare(
                "SELECT id, name, email, age, created_at FROM users ORDER BY created_at DESC, id \
                 DESC",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![], row_to_parts)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut records = Vec::new();
        for row in rows {
            let parts = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            records.push(record_from_parts(parts)?);
        }
        Ok(records)
    }

    /// Loads a single record by identifier.
    fn load_record(&self, id: RecordId) -> Result<Option<UserRecord>, SqliteStoreError> {
        let guard = self.lock()?;
        let parts = guard
            .query_row(
                "SELECT id, name, email, age, created_at FROM users WHERE id = ?1",
                params![id.get()],
                row_to_parts,
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        parts.map(record_from_parts).transpose()
    }

    /// Overwrites the draft fields of an existing record.
    fn update_record(&self, id: RecordId, draft: &UserDraft) -> Result<bool, SqliteStoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE users SET name = ?1, email = ?2, age = ?3 WHERE id = ?4",
                params![draft.name, draft.email, draft.age, id.get()],
            )
            .map_err(|err| map_constraint_error(&err, &draft.email))?;
        Ok(changed > 0)
    }

    /// Deletes a record by identifier.
    fn delete_record(&self, id: RecordId) -> Result<bool, SqliteStoreError> {
        let guard = self.lock()?;
        let removed = guard
            .execute("DELETE FROM users WHERE id = ?1", params![id.get()])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(removed > 0)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Row tuple as read from the `users` table before model conversion.
type RowParts = (i64, String, String, i64, i64);

/// Maps a `users` row to its raw column tuple.
fn row_to_parts(row: &rusqlite::Row<'_>) -> rusqlite::Result<RowParts> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

/// Converts raw row columns into a [`UserRecord`], failing closed on
/// identifiers the data model cannot represent.
fn record_from_parts(parts: RowParts) -> Result<UserRecord, SqliteStoreError> {
    let (raw_id, name, email, age, created_at) = parts;
    let id = RecordId::from_raw(raw_id)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("non-positive user id: {raw_id}")))?;
    Ok(UserRecord {
        id,
        name,
        email,
        age,
        created_at: Timestamp::from_unix_millis(created_at),
    })
}

/// Classifies a write error, surfacing email uniqueness violations as
/// [`SqliteStoreError::Constraint`].
fn map_constraint_error(err: &rusqlite::Error, email: &str) -> SqliteStoreError {
    if let rusqlite::Error::SqliteFailure(failure, message) = err
        && failure.code == ErrorCode::ConstraintViolation
        && message.as_deref().is_some_and(|text| text.contains(EMAIL_UNIQUE_MARKER))
    {
        return SqliteStoreError::Constraint(format!("email already registered: {email}"));
    }
    SqliteStoreError::Db(err.to_string())
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates an existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL UNIQUE,
                    age INTEGER NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_users_created_at
                    ON users (created_at);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
