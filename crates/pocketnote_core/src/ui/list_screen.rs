//! List/editor screen model.
//!
//! # Responsibility
//! - Hold the topic/content editor inputs.
//! - Turn button presses into add/delete/open intents.
//! - Render the current list into a plain view struct.
//!
//! # Invariants
//! - Inputs are cleared only when an add was accepted.
//! - A rejected add keeps the inputs and shows an inline message.
//! - Rows show the topic only.

use crate::model::note::{NoteId, NoteValidationError};
use crate::repo::note_repo::NoteRepository;
use crate::service::note_service::{AddOutcome, NoteService};
use crate::ui::navigation::{NavigationSink, Route};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// One row of the note list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRow {
    pub id: NoteId,
    pub topic: String,
}

/// Rendered list/editor screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub topic_input: String,
    pub content_input: String,
    /// False while either input is blank.
    pub add_enabled: bool,
    pub validation_message: Option<String>,
    pub rows: Vec<NoteRow>,
    /// Transient messages about failed background writes.
    pub status: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListScreen {
    topic: String,
    content: String,
    validation: Option<NoteValidationError>,
}

impl ListScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_topic(&mut self, value: impl Into<String>) {
        self.topic = value.into();
        self.validation = None;
    }

    pub fn set_content(&mut self, value: impl Into<String>) {
        self.content = value.into();
        self.validation = None;
    }

    /// Handles the add button.
    pub fn submit<R: NoteRepository>(&mut self, service: &mut NoteService<R>) -> AddOutcome {
        let outcome = service.add(&self.topic, &self.content);
        match outcome {
            AddOutcome::Submitted => {
                self.topic.clear();
                self.content.clear();
                self.validation = None;
            }
            AddOutcome::Rejected(reason) => self.validation = Some(reason),
        }
        outcome
    }

    /// Handles a row's delete affordance.
    ///
    /// Returns `false` when the row is no longer in the current list.
    pub fn delete_row<R: NoteRepository>(&self, service: &mut NoteService<R>, id: NoteId) -> bool {
        match service.find(id).cloned() {
            Some(note) => {
                service.delete(note);
                true
            }
            None => false,
        }
    }

    /// Handles a row tap by navigating to its detail screen.
    pub fn open_row(&self, id: NoteId, navigation: &mut impl NavigationSink) {
        navigation.navigate(Route::Detail { note_id: id });
    }

    pub fn render<R: NoteRepository>(
        &self,
        service: &NoteService<R>,
        status: Vec<String>,
    ) -> ListView {
        ListView {
            topic_input: self.topic.clone(),
            content_input: self.content.clone(),
            add_enabled: NoteService::<R>::can_add(&self.topic, &self.content),
            validation_message: self.validation.map(|reason| reason.to_string()),
            rows: service
                .current_notes()
                .iter()
                .map(|note| NoteRow {
                    id: note.id,
                    topic: note.topic.clone(),
                })
                .collect(),
            status,
        }
    }
}

impl Display for ListView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Enter the title: {}", self.topic_input)?;
        writeln!(f, "Enter the content: {}", self.content_input)?;
        let add_label = if self.add_enabled {
            "[Add Note]"
        } else {
            "[Add Note] (disabled)"
        };
        writeln!(f, "{add_label}")?;
        if let Some(message) = &self.validation_message {
            writeln!(f, "! {message}")?;
        }
        for message in &self.status {
            writeln!(f, "! {message}")?;
        }
        if self.rows.is_empty() {
            writeln!(f, "(no notes)")?;
        }
        for row in &self.rows {
            writeln!(f, "  #{:<4} {}  [delete]", row.id, row.topic)?;
        }
        Ok(())
    }
}
