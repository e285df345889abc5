//! Connection bootstrap for SQLite-backed persistence.
//!
//! # Responsibility
//! - Open file or in-memory connections with the pragmas the store relies
//!   on, and apply pending migrations before handing the connection out.
//!
//! # Invariants
//! - Returned connections always have all migrations applied.
//! - Bootstrap outcome is logged as a `db_open` event with duration.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the database file at `path` and prepares it for use.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    bootstrap("file", || Connection::open(path.as_ref()).map_err(Into::into))
}

/// Opens a throwaway in-memory database; used by tests and previews.
pub fn open_db_in_memory() -> DbResult<Connection> {
    bootstrap("memory", || {
        Connection::open_in_memory().map_err(Into::into)
    })
}

fn bootstrap(mode: &str, connect: impl FnOnce() -> DbResult<Connection>) -> DbResult<Connection> {
    let started_at = Instant::now();

    let result = connect().and_then(|mut conn| {
        configure(&mut conn)?;
        Ok(conn)
    });

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }

    result
}

fn configure(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
