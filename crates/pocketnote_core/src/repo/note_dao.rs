//! Note data access contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide typed list/insert/delete APIs over the `notes` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `list_all` is ordered by `topic ASC, id ASC`.
//! - `delete` matches on id, topic and content; a miss is a no-op.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::note::{is_blank, Note, NoteDraft};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTE_SELECT_SQL: &str = "SELECT id, topic, content FROM notes";
const NOTE_COLUMNS: [&str; 3] = ["id", "topic", "content"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Medium-level failure (disk full, I/O error, locked database).
    Db(DbError),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// The background storage worker has shut down.
    WorkerUnavailable,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::WorkerUnavailable => write!(f, "storage worker is not running"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
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
        Self::Db(DbError::Query(value))
    }
}

/// Typed access to the notes table.
pub trait NoteDao {
    /// Returns every note ordered by topic, ties by id.
    fn list_all(&self) -> RepoResult<Vec<Note>>;
    /// Inserts a draft and returns it with its store-assigned id.
    fn insert(&self, draft: &NoteDraft) -> RepoResult<Note>;
    /// Deletes the row equal to `note`. Returns whether a row was removed.
    fn delete(&self, note: &Note) -> RepoResult<bool>;
}

/// SQLite-backed note data access object.
///
/// Owns its connection so it can be moved onto the storage worker thread.
pub struct SqliteNoteDao {
    conn: Connection,
}

impl SqliteNoteDao {
    /// Wraps a migrated connection after checking the notes schema is present.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl NoteDao for SqliteNoteDao {
    fn list_all(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{NOTE_SELECT_SQL} ORDER BY topic ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn insert(&self, draft: &NoteDraft) -> RepoResult<Note> {
        self.conn.execute(
            "INSERT INTO notes (topic, content) VALUES (?1, ?2);",
            params![draft.topic(), draft.content()],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(draft.clone().into_note(id))
    }

    fn delete(&self, note: &Note) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM notes
             WHERE id = ?1
               AND topic = ?2
               AND content = ?3;",
            params![note.id, note.topic.as_str(), note.content.as_str()],
        )?;
        Ok(changed > 0)
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let note = Note {
        id: row.get("id")?,
        topic: row.get("topic")?,
        content: row.get("content")?,
    };
    if is_blank(&note.topic) || is_blank(&note.content) {
        return Err(RepoError::InvalidData(format!(
            "note {} has blank topic or content",
            note.id
        )));
    }
    Ok(note)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "notes")? {
        return Err(RepoError::MissingRequiredTable("notes"));
    }
    for column in NOTE_COLUMNS {
        if !table_has_column(conn, "notes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
