//! Single-flight write queue for one storage key.
//!
//! Mutations stage a full snapshot while they still hold the state lock,
//! which fixes the order of snapshots for the key. Persisting happens later,
//! outside that lock:
//!
//! - only the newest staged snapshot is kept (latest state wins)
//! - at most one write for the key is in flight
//! - a caller returns once its snapshot, or a newer one, has been written
//!
//! Write failures are logged and count as completed; the in-memory state
//! stays authoritative.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, error};

use crate::storage::KeyValueStore;

/// A pending write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WriteOp {
    /// Replace the stored value.
    Set(String),
    /// Delete the key.
    Remove,
}

/// Handle returned by [`WriteQueue::stage`], redeemed with [`WriteQueue::persist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[must_use = "a staged write is only persisted once its ticket is redeemed"]
pub(crate) struct Ticket(u64);

impl Ticket {
    /// A ticket with nothing to wait for.
    pub(crate) const SATISFIED: Self = Self(0);
}

#[derive(Debug)]
pub(crate) struct WriteQueue {
    key: String,
    staged: Mutex<Option<(Ticket, WriteOp)>>,
    in_flight: tokio::sync::Mutex<()>,
    last_staged: AtomicU64,
    completed: AtomicU64,
}

impl WriteQueue {
    pub(crate) fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            staged: Mutex::new(None),
            in_flight: tokio::sync::Mutex::new(()),
            last_staged: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    /// Stage `op` as the newest state for this key.
    ///
    /// Callers must hold the lock guarding the state `op` was built from.
    pub(crate) fn stage(&self, op: WriteOp) -> Ticket {
        let ticket = Ticket(self.last_staged.fetch_add(1, Ordering::AcqRel) + 1);
        let mut staged = self.staged.lock().unwrap_or_else(PoisonError::into_inner);
        if staged.as_ref().is_none_or(|(current, _)| *current < ticket) {
            *staged = Some((ticket, op));
        }
        ticket
    }

    /// Wait until the state staged under `ticket`, or a newer one, is written.
    pub(crate) async fn persist<S: KeyValueStore>(&self, storage: &S, ticket: Ticket) {
        let _guard = self.in_flight.lock().await;
        if self.completed.load(Ordering::Acquire) >= ticket.0 {
            debug!(key = %self.key, "Write superseded by a newer snapshot");
            return;
        }

        let next = self
            .staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some((staged_ticket, op)) = next else {
            return;
        };

        let result = match &op {
            WriteOp::Set(value) => storage.set(&self.key, value).await,
            WriteOp::Remove => storage.remove(&self.key).await,
        };
        match result {
            Ok(()) => debug!(key = %self.key, op = op.name(), "Persisted"),
            Err(e) => error!(key = %self.key, op = op.name(), error = %e, "Failed to persist"),
        }

        self.completed.fetch_max(staged_ticket.0, Ordering::AcqRel);
    }

    /// Wait until everything staged so far has been written.
    pub(crate) async fn flush<S: KeyValueStore>(&self, storage: &S) {
        let last = self.last_staged.load(Ordering::Acquire);
        if last > 0 {
            self.persist(storage, Ticket(last)).await;
        }
    }
}

impl WriteOp {
    const fn name(&self) -> &'static str {
        match self {
            Self::Set(_) => "set",
            Self::Remove => "remove",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    /// Records every write it receives.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        writes: Mutex<Vec<Option<String>>>,
    }

    impl KeyValueStore for RecordingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.writes.lock().unwrap().push(Some(value.to_owned()));
            tokio::task::yield_now().await;
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.writes.lock().unwrap().push(None);
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn test_persist_writes_staged_value() {
        let store = RecordingStore::default();
        let queue = WriteQueue::new("cart");

        let ticket = queue.stage(WriteOp::Set("a".to_owned()));
        queue.persist(&store, ticket).await;

        assert_eq!(store.inner.peek("cart").as_deref(), Some("a"));
        assert_eq!(*store.writes.lock().unwrap(), vec![Some("a".to_owned())]);
    }

    #[tokio::test]
    async fn test_latest_state_wins_and_stale_tickets_skip() {
        let store = RecordingStore::default();
        let queue = WriteQueue::new("cart");

        let first = queue.stage(WriteOp::Set("a".to_owned()));
        let second = queue.stage(WriteOp::Set("b".to_owned()));
        queue.persist(&store, second).await;
        queue.persist(&store, first).await;

        assert_eq!(store.inner.peek("cart").as_deref(), Some("b"));
        assert_eq!(*store.writes.lock().unwrap(), vec![Some("b".to_owned())]);
    }

    #[tokio::test]
    async fn test_remove_op() {
        let store = RecordingStore::default();
        store.inner.set("cart", "a").await.unwrap();
        let queue = WriteQueue::new("cart");

        let ticket = queue.stage(WriteOp::Remove);
        queue.persist(&store, ticket).await;
        assert!(!store.inner.contains_key("cart"));
    }

    #[tokio::test]
    async fn test_concurrent_persist_never_ends_stale() {
        let store = Arc::new(RecordingStore::default());
        let queue = Arc::new(WriteQueue::new("cart"));

        let mut handles = Vec::new();
        for i in 0..16 {
            let ticket = queue.stage(WriteOp::Set(i.to_string()));
            let (store, queue) = (Arc::clone(&store), Arc::clone(&queue));
            handles.push(tokio::spawn(async move {
                queue.persist(store.as_ref(), ticket).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.inner.peek("cart").as_deref(), Some("15"));
        assert!(store.writes.lock().unwrap().len() <= 16);
    }

    #[tokio::test]
    async fn test_flush_with_nothing_staged() {
        let store = RecordingStore::default();
        let queue = WriteQueue::new("cart");
        queue.flush(&store).await;
        assert!(store.writes.lock().unwrap().is_empty());
        assert_eq!(queue.key(), "cart");
    }
}
