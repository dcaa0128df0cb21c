//! Note list state holder.
//!
//! # Responsibility
//! - Hold the live, ordered note list the presentation layer renders.
//! - Validate and forward add/delete intents to the repository without
//!   blocking the caller.
//! - Turn failed background writes into transient status messages.
//!
//! # Invariants
//! - `current_notes` is empty until the first snapshot arrives.
//! - Blank input never reaches the repository.
//! - Intents are forwarded in the order they are issued.

use crate::model::note::{Note, NoteDraft, NoteId, NoteValidationError};
use crate::repo::live::{NotesSubscription, PendingWrite, UpdateSignal};
use crate::repo::note_dao::RepoResult;
use crate::repo::note_repo::NoteRepository;
use log::{info, warn};
use std::time::Duration;

/// Result of an add intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Forwarded to storage; the list update is the completion signal.
    Submitted,
    /// Dropped locally; nothing was written.
    Rejected(NoteValidationError),
}

enum PendingIntent {
    Add(PendingWrite<Note>),
    Delete(PendingWrite<bool>),
}

/// State holder over any `NoteRepository` implementation.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    subscription: NotesSubscription,
    notes: Vec<Note>,
    pending: Vec<PendingIntent>,
    status: Vec<String>,
}

impl<R: NoteRepository> NoteService<R> {
    /// Subscribes to the repository list and starts with an empty list.
    pub fn new(repo: R) -> RepoResult<Self> {
        let subscription = repo.observe_all()?;
        Ok(Self {
            repo,
            subscription,
            notes: Vec::new(),
            pending: Vec::new(),
            status: Vec::new(),
        })
    }

    /// Latest delivered snapshot, ordered by topic.
    pub fn current_notes(&self) -> &[Note] {
        &self.notes
    }

    /// Looks a note up by id in the current snapshot.
    pub fn find(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Returns whether `add` would accept this input.
    pub fn can_add(topic: &str, content: &str) -> bool {
        NoteDraft::new(topic, content).is_ok()
    }

    /// Validates and forwards an add intent.
    pub fn add(&mut self, topic: &str, content: &str) -> AddOutcome {
        match NoteDraft::new(topic, content) {
            Ok(draft) => {
                self.pending
                    .push(PendingIntent::Add(self.repo.insert(draft)));
                AddOutcome::Submitted
            }
            Err(reason) => {
                info!(
                    "event=note_add module=service status=rejected reason={:?}",
                    reason
                );
                AddOutcome::Rejected(reason)
            }
        }
    }

    /// Forwards a delete intent unconditionally.
    pub fn delete(&mut self, note: Note) {
        self.pending
            .push(PendingIntent::Delete(self.repo.delete(note)));
    }

    /// Applies any queued snapshot and collects finished writes.
    ///
    /// Never blocks. Returns whether the list changed.
    pub fn refresh(&mut self) -> bool {
        self.collect_finished();
        match self.subscription.latest() {
            Some(notes) => self.replace_notes(notes),
            None => false,
        }
    }

    /// Waits up to `timeout` for a new snapshot, then drains the rest.
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        let changed = match self.subscription.recv_timeout(timeout) {
            Some(notes) => self.replace_notes(notes),
            None => false,
        };
        self.refresh() || changed
    }

    /// Wake handle another thread can wait on while this holder is busy or
    /// locked; call `refresh` afterwards to apply the snapshot.
    pub fn update_signal(&self) -> UpdateSignal {
        self.subscription.signal()
    }

    /// Blocks until every issued intent has completed, then refreshes.
    ///
    /// The worker publishes before replying, so the final snapshot is
    /// already queued once the last write reports back.
    pub fn flush(&mut self) {
        for intent in std::mem::take(&mut self.pending) {
            match intent {
                PendingIntent::Add(write) => self.record(write.wait().map(|_| ()), "save"),
                PendingIntent::Delete(write) => self.record(write.wait().map(|_| ()), "delete"),
            }
        }
        self.refresh();
    }

    /// Drains transient status messages produced by failed writes.
    pub fn take_status(&mut self) -> Vec<String> {
        std::mem::take(&mut self.status)
    }

    /// Number of intents whose completion has not been observed yet.
    pub fn pending_intents(&self) -> usize {
        self.pending.len()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Releases the repository; the subscription is dropped with `self`.
    pub fn into_repository(self) -> R {
        self.repo
    }

    fn replace_notes(&mut self, notes: Vec<Note>) -> bool {
        if notes == self.notes {
            return false;
        }
        self.notes = notes;
        true
    }

    fn collect_finished(&mut self) {
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for intent in std::mem::take(&mut self.pending) {
            match intent {
                PendingIntent::Add(write) => match write.try_result() {
                    Some(result) => self.record(result.map(|_| ()), "save"),
                    None => still_pending.push(PendingIntent::Add(write)),
                },
                PendingIntent::Delete(write) => match write.try_result() {
                    Some(result) => self.record(result.map(|_| ()), "delete"),
                    None => still_pending.push(PendingIntent::Delete(write)),
                },
            }
        }
        self.pending = still_pending;
    }

    fn record(&mut self, result: RepoResult<()>, action: &'static str) {
        if let Err(err) = result {
            warn!(
                "event=note_{} module=service status=error error_code=write_failed error={}",
                action, err
            );
            self.status.push(format!("Could not {action} note: {err}"));
        }
    }
}
