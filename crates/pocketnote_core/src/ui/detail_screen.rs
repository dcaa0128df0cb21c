//! Detail screen model.
//!
//! Re-reads the note by id from the live list on every render, so a note
//! deleted after navigation renders as missing instead of stale text.

use crate::model::note::NoteId;
use crate::repo::note_repo::NoteRepository;
use crate::service::note_service::NoteService;
use crate::ui::navigation::{NavigationSink, Route};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Rendered detail screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DetailView {
    Note {
        id: NoteId,
        topic: String,
        content: String,
    },
    Missing {
        note_id: NoteId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailScreen {
    note_id: NoteId,
}

impl DetailScreen {
    pub fn new(note_id: NoteId) -> Self {
        Self { note_id }
    }

    pub fn note_id(&self) -> NoteId {
        self.note_id
    }

    pub fn render<R: NoteRepository>(&self, service: &NoteService<R>) -> DetailView {
        match service.find(self.note_id) {
            Some(note) => DetailView::Note {
                id: note.id,
                topic: note.topic.clone(),
                content: note.content.clone(),
            },
            None => DetailView::Missing {
                note_id: self.note_id,
            },
        }
    }

    /// Handles the back action.
    pub fn back(&self, navigation: &mut impl NavigationSink) {
        navigation.navigate(Route::List);
    }
}

impl Display for DetailView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Note { topic, content, .. } => {
                writeln!(f, "Topic: {topic}")?;
                writeln!(f)?;
                writeln!(f, "Content: {content}")?;
            }
            Self::Missing { note_id } => writeln!(f, "Note #{note_id} no longer exists.")?,
        }
        writeln!(f)?;
        writeln!(f, "[Back to Notes]")
    }
}
