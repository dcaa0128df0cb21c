//! Background storage worker.
//!
//! # Responsibility
//! - Own the data access object on a dedicated thread so callers never block
//!   on SQLite.
//! - Apply writes in the order they were issued.
//! - Re-deliver the full ordered list to every subscriber after each write
//!   that changed a row.
//!
//! # Invariants
//! - One FIFO command queue; writes are never reordered.
//! - New subscribers receive the current snapshot immediately.
//! - Dropping the handle shuts the thread down and joins it.

use crate::model::note::{Note, NoteDraft};
use crate::repo::live::{
    snapshot_channel, NotesSubscription, PendingWrite, SnapshotSender, SubscriberSet,
};
use crate::repo::note_dao::{NoteDao, RepoError, RepoResult};
use log::{debug, error, info, warn};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

const WORKER_THREAD_NAME: &str = "pocketnote-storage";

/// Counters reported when the worker stops.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerStats {
    pub inserts: usize,
    pub deletes: usize,
    pub failed_writes: usize,
    pub broadcasts: usize,
}

enum Command {
    Insert {
        draft: NoteDraft,
        reply: Sender<RepoResult<Note>>,
    },
    Delete {
        note: Note,
        reply: Sender<RepoResult<bool>>,
    },
    Subscribe(SnapshotSender),
    Shutdown,
}

/// Handle to the storage thread.
pub struct StorageWorker {
    tx: Sender<Command>,
    handle: Option<JoinHandle<WorkerStats>>,
}

impl StorageWorker {
    /// Moves `dao` onto a new storage thread.
    ///
    /// # Errors
    /// - Returns `RepoError::WorkerUnavailable` when the OS refuses to spawn
    ///   the thread.
    pub fn spawn<D>(dao: D) -> RepoResult<Self>
    where
        D: NoteDao + Send + 'static,
    {
        let (tx, rx) = channel();
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run(dao, rx))
            .map_err(|err| {
                error!(
                    "event=worker_spawn module=repo status=error error_code=spawn_failed error={}",
                    err
                );
                RepoError::WorkerUnavailable
            })?;
        info!("event=worker_spawn module=repo status=ok");

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Queues an insert.
    pub fn insert(&self, draft: NoteDraft) -> PendingWrite<Note> {
        let (reply, rx) = channel();
        let _ = self.tx.send(Command::Insert { draft, reply });
        PendingWrite::new(rx)
    }

    /// Queues a delete.
    pub fn delete(&self, note: Note) -> PendingWrite<bool> {
        let (reply, rx) = channel();
        let _ = self.tx.send(Command::Delete { note, reply });
        PendingWrite::new(rx)
    }

    /// Registers a new observer of the ordered note list.
    pub fn subscribe(&self) -> RepoResult<NotesSubscription> {
        let (sender, subscription) = snapshot_channel();
        self.tx
            .send(Command::Subscribe(sender))
            .map_err(|_| RepoError::WorkerUnavailable)?;
        Ok(subscription)
    }

    /// Stops the thread after draining already queued commands.
    pub fn stop(mut self) -> WorkerStats {
        self.shutdown().unwrap_or_default()
    }

    fn shutdown(&mut self) -> Option<WorkerStats> {
        let handle = self.handle.take()?;
        let _ = self.tx.send(Command::Shutdown);
        match handle.join() {
            Ok(stats) => Some(stats),
            Err(_) => {
                error!("event=worker_stop module=repo status=error error_code=worker_panicked");
                None
            }
        }
    }
}

impl Drop for StorageWorker {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn run<D: NoteDao>(dao: D, rx: Receiver<Command>) -> WorkerStats {
    let mut stats = WorkerStats::default();
    let mut subscribers = SubscriberSet::default();

    while let Ok(command) = rx.recv() {
        match command {
            Command::Insert { draft, reply } => {
                let result = dao.insert(&draft);
                match &result {
                    Ok(note) => {
                        stats.inserts += 1;
                        debug!("event=note_insert module=repo status=ok note_id={}", note.id);
                        publish(&dao, &mut subscribers, &mut stats);
                    }
                    Err(err) => {
                        stats.failed_writes += 1;
                        warn!(
                            "event=note_insert module=repo status=error error_code=write_failed error={}",
                            err
                        );
                    }
                }
                let _ = reply.send(result);
            }
            Command::Delete { note, reply } => {
                let result = dao.delete(&note);
                match &result {
                    Ok(true) => {
                        stats.deletes += 1;
                        debug!("event=note_delete module=repo status=ok note_id={}", note.id);
                        publish(&dao, &mut subscribers, &mut stats);
                    }
                    Ok(false) => {
                        debug!(
                            "event=note_delete module=repo status=noop note_id={}",
                            note.id
                        );
                    }
                    Err(err) => {
                        stats.failed_writes += 1;
                        warn!(
                            "event=note_delete module=repo status=error error_code=write_failed error={}",
                            err
                        );
                    }
                }
                let _ = reply.send(result);
            }
            Command::Subscribe(sender) => match dao.list_all() {
                Ok(snapshot) => subscribers.add(sender, &snapshot),
                Err(err) => {
                    error!(
                        "event=notes_subscribe module=repo status=error error_code=query_failed error={}",
                        err
                    );
                }
            },
            Command::Shutdown => break,
        }
    }

    info!(
        "event=worker_stop module=repo status=ok inserts={} deletes={} failed_writes={} broadcasts={}",
        stats.inserts, stats.deletes, stats.failed_writes, stats.broadcasts
    );
    stats
}

fn publish<D: NoteDao>(dao: &D, subscribers: &mut SubscriberSet, stats: &mut WorkerStats) {
    match dao.list_all() {
        Ok(snapshot) => {
            subscribers.broadcast(&snapshot);
            stats.broadcasts += 1;
        }
        Err(err) => {
            error!(
                "event=notes_broadcast module=repo status=error error_code=query_failed error={}",
                err
            );
        }
    }
}
