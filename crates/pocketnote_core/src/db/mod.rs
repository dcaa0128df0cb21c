//! Note store bootstrap.
//!
//! # Responsibility
//! - Open the SQLite file (or an in-memory store) backing the notes table.
//! - Bring the schema up to the version this binary ships.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - No note is read or written before the schema is current.
//! - A store written by a newer binary is refused, never downgraded.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Storage-level failure.
///
/// `Open`, `Migration` and `UnsupportedSchemaVersion` are fatal for app
/// startup. `Query` is raised by statements on an already open store.
#[derive(Debug)]
pub enum DbError {
    /// The medium could not be opened or configured.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// A schema step failed; the store keeps its previous version.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The store was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Query(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open note store {}: {source}", path.display())
            }
            Self::Migration { version, source } => {
                write!(f, "schema step {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "note store schema {db_version} is newer than supported {latest_supported}"
            ),
            Self::Query(source) => write!(f, "{source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } | Self::Query(source) => {
                Some(source)
            }
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}
