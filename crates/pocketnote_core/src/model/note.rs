//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its unsaved draft form.
//! - Reject blank topic/content before anything reaches storage.
//!
//! # Invariants
//! - `id` is assigned by the store, never reused, never changed.
//! - A `NoteDraft` can only be built from non-blank topic and content.
//! - Topic and content are stored verbatim; validation does not trim them.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned note identifier (SQLite rowid).
pub type NoteId = i64;

/// A persisted note.
///
/// Equality covers all three fields; deletion matches on the full value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub topic: String,
    pub content: String,
}

/// Validated, not yet persisted note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    topic: String,
    content: String,
}

/// Rejection reason for blank note input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    BlankTopic,
    BlankContent,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTopic => write!(f, "topic must not be blank"),
            Self::BlankContent => write!(f, "content must not be blank"),
        }
    }
}

impl Error for NoteValidationError {}

impl NoteDraft {
    /// Builds a draft after checking both fields are non-blank.
    ///
    /// Topic is checked first, so input blank in both fields reports
    /// `BlankTopic`.
    pub fn new(
        topic: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, NoteValidationError> {
        let topic = topic.into();
        let content = content.into();
        if is_blank(&topic) {
            return Err(NoteValidationError::BlankTopic);
        }
        if is_blank(&content) {
            return Err(NoteValidationError::BlankContent);
        }
        Ok(Self { topic, content })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Attaches the store-assigned id.
    pub fn into_note(self, id: NoteId) -> Note {
        Note {
            id,
            topic: self.topic,
            content: self.content,
        }
    }
}

/// Returns whether `value` is empty once surrounding whitespace is removed.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
