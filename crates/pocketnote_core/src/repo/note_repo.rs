//! Note repository façade.
//!
//! # Responsibility
//! - Decouple the state holder from storage details.
//! - Forward observe/insert/delete to the storage worker unchanged.
//!
//! # Invariants
//! - No logic beyond forwarding; substitutes (test fakes) only need to
//!   honour the same contract.

use crate::model::note::{Note, NoteDraft};
use crate::repo::live::{NotesSubscription, PendingWrite};
use crate::repo::note_dao::{NoteDao, RepoResult};
use crate::repo::worker::{StorageWorker, WorkerStats};

/// Repository interface used by the state holder.
pub trait NoteRepository {
    /// Subscribes to the ordered note list.
    fn observe_all(&self) -> RepoResult<NotesSubscription>;
    /// Queues an insert; completion is optional to inspect.
    fn insert(&self, draft: NoteDraft) -> PendingWrite<Note>;
    /// Queues a delete; completion is optional to inspect.
    fn delete(&self, note: Note) -> PendingWrite<bool>;
}

/// Repository backed by the background storage worker.
pub struct WorkerNoteRepository {
    worker: StorageWorker,
}

impl WorkerNoteRepository {
    /// Starts a storage worker over `dao`.
    pub fn spawn<D>(dao: D) -> RepoResult<Self>
    where
        D: NoteDao + Send + 'static,
    {
        Ok(Self {
            worker: StorageWorker::spawn(dao)?,
        })
    }

    /// Stops the storage worker and returns its counters.
    pub fn shutdown(self) -> WorkerStats {
        self.worker.stop()
    }
}

impl NoteRepository for WorkerNoteRepository {
    fn observe_all(&self) -> RepoResult<NotesSubscription> {
        self.worker.subscribe()
    }

    fn insert(&self, draft: NoteDraft) -> PendingWrite<Note> {
        self.worker.insert(draft)
    }

    fn delete(&self, note: Note) -> PendingWrite<bool> {
        self.worker.delete(note)
    }
}
