//! Task collection persistence contract and SQLite implementation.
//!
//! # Responsibility
//! - Load and save the serialized task collection as one JSON document.
//! - Recover locally from malformed persisted state instead of failing the
//!   caller.
//!
//! # Invariants
//! - A malformed document loads as `None` (and is logged); the store then
//!   reseeds and overwrites it on the next save.
//! - `save_collection` replaces the whole document atomically (single
//!   upsert).

use crate::db::{migrations, DbError};
use crate::model::task::Task;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key of the task collection document.
const COLLECTION_KEY: &str = "tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence-layer error for collection load/save operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// The in-memory collection could not be serialized; nothing was
    /// written.
    Encode(serde_json::Error),
    /// The connection has not been migrated (`PRAGMA user_version` is
    /// behind this build).
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode task collection: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}; \
                 open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable storage contract consumed by the task store.
pub trait TaskRepository {
    /// Reads the persisted collection.
    ///
    /// Returns `None` both when nothing has ever been persisted and when
    /// the persisted document is unreadable; the caller reseeds in either
    /// case.
    fn load_collection(&self) -> RepoResult<Option<Vec<Task>>>;

    /// Replaces the persisted collection with `tasks`.
    fn save_collection(&self, tasks: &[Task]) -> RepoResult<()>;
}

/// SQLite-backed repository storing the collection as one JSON document in
/// the `documents` table.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository after validating the connection is migrated
    /// and carries the required schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected = migrations::latest_version();
        let actual: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual < expected {
            return Err(RepoError::UninitializedConnection {
                expected_version: expected,
                actual_version: actual,
            });
        }

        let documents_present: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'documents'
            );",
            [],
            |row| row.get(0),
        )?;
        if documents_present == 0 {
            return Err(RepoError::MissingRequiredTable("documents"));
        }

        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn load_collection(&self) -> RepoResult<Option<Vec<Task>>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE key = ?1;",
                [COLLECTION_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let body = match body {
            Some(body) => body,
            None => return Ok(None),
        };

        match serde_json::from_str::<Vec<Task>>(&body) {
            Ok(tasks) => Ok(Some(tasks)),
            Err(err) => {
                warn!(
                    "event=collection_load module=repo status=recovered \
                     reason=malformed_document error={err}"
                );
                Ok(None)
            }
        }
    }

    fn save_collection(&self, tasks: &[Task]) -> RepoResult<()> {
        let body = serde_json::to_string(tasks).map_err(RepoError::Encode)?;
        self.conn.execute(
            "INSERT INTO documents (key, body, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at;",
            params![COLLECTION_KEY, body],
        )?;
        Ok(())
    }
}
