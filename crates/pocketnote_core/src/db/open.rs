//! Opening and configuring the note store connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - Returned connections carry the current schema.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Path reported for in-memory stores.
const MEMORY_TARGET: &str = ":memory:";

/// Opens (or creates) the note store file and brings its schema current.
///
/// The parent directory must already exist.
///
/// # Errors
/// - `DbError::Open` when the file cannot be opened or configured.
/// - `DbError::Migration` / `DbError::UnsupportedSchemaVersion` from the
///   schema step.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with("file", path.to_path_buf(), || Connection::open(path))
}

/// Opens a throwaway in-memory note store.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(
        "memory",
        PathBuf::from(MEMORY_TARGET),
        Connection::open_in_memory,
    )
}

fn open_with(
    mode: &'static str,
    path: PathBuf,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let result = connect()
        .and_then(|conn| configure(&conn).map(|()| conn))
        .map_err(|source| DbError::Open { path, source })
        .and_then(|mut conn| apply_migrations(&mut conn).map(|()| conn));

    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event=db_open module=db status=ok mode={mode} duration_ms={duration_ms}"),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code={} error={}",
            mode,
            duration_ms,
            error_code(err),
            err
        ),
    }
    result
}

fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)
}

fn error_code(err: &DbError) -> &'static str {
    match err {
        DbError::Open { .. } => "db_open_failed",
        DbError::Migration { .. } => "db_migration_failed",
        DbError::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        DbError::Query(_) => "db_query_failed",
    }
}
