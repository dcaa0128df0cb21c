//! Live note-list subscriptions.
//!
//! # Responsibility
//! - Deliver full note-list snapshots from the storage worker to observers.
//! - Let another thread wait for a fresh snapshot without owning the
//!   subscription.
//! - Carry one-shot write completions back to intent issuers.
//!
//! # Invariants
//! - Every snapshot is the complete ordered list, never a delta.
//! - Each observer holds at most one undelivered snapshot: a newer one
//!   replaces it, so memory stays bounded by one list per observer.
//! - Observers that drop their subscription are pruned on the next broadcast.

use crate::model::note::Note;
use crate::repo::note_dao::{RepoError, RepoResult};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::time::Duration;

#[derive(Default)]
struct SlotState {
    latest: Option<Vec<Note>>,
    closed: bool,
}

impl SlotState {
    fn settled(&self) -> bool {
        self.latest.is_some() || self.closed
    }
}

#[derive(Default)]
struct SnapshotSlot {
    state: Mutex<SlotState>,
    changed: Condvar,
}

impl SnapshotSlot {
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Waits until a snapshot is pending or the publisher is gone.
    fn wait_settled(&self, timeout: Option<Duration>) -> MutexGuard<'_, SlotState> {
        let guard = self.lock();
        match timeout {
            Some(timeout) => match self
                .changed
                .wait_timeout_while(guard, timeout, |state| !state.settled())
            {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            },
            None => self
                .changed
                .wait_while(guard, |state| !state.settled())
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        }
    }
}

/// Creates a connected publisher/subscription pair.
pub(crate) fn snapshot_channel() -> (SnapshotSender, NotesSubscription) {
    let slot = Arc::new(SnapshotSlot::default());
    (
        SnapshotSender {
            slot: Arc::clone(&slot),
        },
        NotesSubscription { slot },
    )
}

/// Publishing end of one subscription. Dropping it closes the subscription.
pub(crate) struct SnapshotSender {
    slot: Arc<SnapshotSlot>,
}

impl SnapshotSender {
    /// Replaces the pending snapshot. Returns `false` once the observer is gone.
    pub(crate) fn send(&self, snapshot: &[Note]) -> bool {
        if Arc::strong_count(&self.slot) == 1 {
            return false;
        }
        self.slot.lock().latest = Some(snapshot.to_vec());
        self.slot.changed.notify_all();
        true
    }
}

impl Drop for SnapshotSender {
    fn drop(&mut self) {
        self.slot.lock().closed = true;
        self.slot.changed.notify_all();
    }
}

/// Receiving end of a continuously updating note list.
pub struct NotesSubscription {
    slot: Arc<SnapshotSlot>,
}

impl NotesSubscription {
    /// Blocks until the next snapshot. `None` once the worker is gone.
    pub fn recv(&self) -> Option<Vec<Note>> {
        self.slot.wait_settled(None).latest.take()
    }

    /// Waits up to `timeout` for the next snapshot.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Vec<Note>> {
        self.slot.wait_settled(Some(timeout)).latest.take()
    }

    /// Takes the newest pending snapshot without blocking.
    pub fn latest(&self) -> Option<Vec<Note>> {
        self.slot.lock().latest.take()
    }

    /// Wake handle usable from another thread.
    pub fn signal(&self) -> UpdateSignal {
        UpdateSignal {
            slot: Arc::downgrade(&self.slot),
        }
    }
}

impl Drop for NotesSubscription {
    fn drop(&mut self) {
        let mut state = self.slot.lock();
        state.latest = None;
        state.closed = true;
        drop(state);
        self.slot.changed.notify_all();
    }
}

/// Waits for a snapshot to become pending on a subscription it does not own.
///
/// Waiting leaves the snapshot in place for the subscription holder.
#[derive(Clone)]
pub struct UpdateSignal {
    slot: Weak<SnapshotSlot>,
}

impl UpdateSignal {
    /// Returns whether a snapshot is pending after at most `timeout`.
    ///
    /// `false` on timeout or when the subscription or its publisher is gone.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.slot.upgrade() {
            Some(slot) => slot.wait_settled(Some(timeout)).latest.is_some(),
            None => false,
        }
    }
}

/// Broadcast set held by the storage worker.
#[derive(Default)]
pub(crate) struct SubscriberSet {
    senders: Vec<SnapshotSender>,
}

impl SubscriberSet {
    pub(crate) fn add(&mut self, sender: SnapshotSender, snapshot: &[Note]) {
        if sender.send(snapshot) {
            self.senders.push(sender);
        }
    }

    pub(crate) fn broadcast(&mut self, snapshot: &[Note]) {
        self.senders.retain(|sender| sender.send(snapshot));
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}

/// Completion handle for one background write.
///
/// Dropping it is allowed: the write still runs.
#[must_use = "drop explicitly when the completion is not needed"]
pub struct PendingWrite<T> {
    rx: Receiver<RepoResult<T>>,
}

impl<T> PendingWrite<T> {
    pub(crate) fn new(rx: Receiver<RepoResult<T>>) -> Self {
        Self { rx }
    }

    /// Blocks until the write finished.
    pub fn wait(self) -> RepoResult<T> {
        self.rx.recv().unwrap_or(Err(RepoError::WorkerUnavailable))
    }

    /// Returns the result when the write already finished.
    pub fn try_result(&self) -> Option<RepoResult<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(RepoError::WorkerUnavailable)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{snapshot_channel, PendingWrite, SubscriberSet};
    use crate::model::note::Note;
    use crate::repo::note_dao::RepoError;
    use std::sync::mpsc::channel;
    use std::thread;
    use std::time::{Duration, Instant};

    fn note(id: i64, topic: &str) -> Note {
        Note {
            id,
            topic: topic.to_string(),
            content: "body".to_string(),
        }
    }

    #[test]
    fn newer_snapshot_replaces_undelivered_one() {
        let (sender, subscription) = snapshot_channel();
        for id in 1..=50 {
            let snapshot = (1..=id).map(|n| note(n, "a")).collect::<Vec<_>>();
            assert!(sender.send(&snapshot));
        }

        assert_eq!(subscription.latest().unwrap().len(), 50);
        assert!(subscription.latest().is_none());
    }

    #[test]
    fn dropping_the_sender_ends_the_subscription() {
        let (sender, subscription) = snapshot_channel();
        sender.send(&[note(1, "a")]);
        drop(sender);

        assert_eq!(subscription.recv(), Some(vec![note(1, "a")]));
        assert!(subscription.recv().is_none());
        assert!(subscription
            .recv_timeout(Duration::from_millis(10))
            .is_none());
    }

    #[test]
    fn subscriber_set_prunes_dropped_subscriptions() {
        let mut set = SubscriberSet::default();
        let (kept_tx, kept) = snapshot_channel();
        let (dropped_tx, dropped) = snapshot_channel();
        set.add(kept_tx, &[]);
        set.add(dropped_tx, &[]);
        drop(dropped);

        set.broadcast(&[note(1, "a")]);
        assert_eq!(set.len(), 1);
        assert_eq!(kept.latest(), Some(vec![note(1, "a")]));
    }

    #[test]
    fn signal_wakes_another_thread_without_consuming() {
        let (sender, subscription) = snapshot_channel();
        let signal = subscription.signal();
        let waiter = thread::spawn(move || signal.wait(Duration::from_secs(5)));

        thread::sleep(Duration::from_millis(50));
        sender.send(&[note(1, "a")]);
        assert!(waiter.join().unwrap());
        assert_eq!(subscription.latest(), Some(vec![note(1, "a")]));
    }

    #[test]
    fn signal_times_out_and_outlives_subscription_safely() {
        let (_sender, subscription) = snapshot_channel();
        let signal = subscription.signal();

        let started = Instant::now();
        assert!(!signal.wait(Duration::from_millis(20)));
        assert!(started.elapsed() >= Duration::from_millis(20));

        drop(subscription);
        assert!(!signal.wait(Duration::from_secs(5)));
    }

    #[test]
    fn pending_write_reports_worker_loss() {
        let (tx, rx) = channel::<Result<bool, RepoError>>();
        drop(tx);
        let pending = PendingWrite::new(rx);
        assert!(matches!(
            pending.try_result(),
            Some(Err(RepoError::WorkerUnavailable))
        ));
        assert!(matches!(pending.wait(), Err(RepoError::WorkerUnavailable)));
    }
}
