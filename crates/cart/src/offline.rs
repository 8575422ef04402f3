//! Offline catalog cache and pending action queue.
//!
//! While the device is offline, actions that would normally reach a backend
//! are queued and persisted. When connectivity returns the queue is replayed
//! through an [`ActionSink`]; actions the sink rejects are queued again in
//! their original order.
//!
//! Catalog data can also be cached under `offline_*` keys so product lists
//! render without a network.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use pocketshop_core::Product;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::codec;
use crate::storage::{KeyValueStore, StorageKeys};

const PRODUCTS: &str = "products";
const CATEGORIES: &str = "categories";

/// Kind of a queued action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    AddToCart,
    AddToWishlist,
    PlaceOrder,
}

/// An action waiting for connectivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Action-specific data, passed to the sink untouched.
    #[serde(default)]
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Receives queued actions when the device comes back online.
pub trait ActionSink: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver one action. An error re-queues it for the next sync.
    fn deliver(
        &self,
        action: &PendingAction,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Outcome of a sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub delivered: usize,
    pub requeued: usize,
}

/// Offline cache and action queue.
pub struct OfflineStore<S> {
    storage: Arc<S>,
    keys: StorageKeys,
    online: AtomicBool,
    pending: Mutex<Vec<PendingAction>>,
}

impl<S: KeyValueStore> OfflineStore<S> {
    /// Create a store that assumes the device is online.
    #[must_use]
    pub fn new(storage: Arc<S>, keys: &StorageKeys) -> Self {
        Self {
            storage,
            keys: keys.clone(),
            online: AtomicBool::new(true),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Restore the saved action queue. Failures leave it empty.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        let actions = match self.storage.get(&self.keys.pending_actions).await {
            Ok(Some(raw)) => codec::decode(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable pending actions");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read pending actions");
                Vec::new()
            }
        };
        info!(pending = actions.len(), "Loaded pending actions");
        *self.pending.lock().await = actions;
    }

    // =========================================================================
    // Connectivity
    // =========================================================================

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_offline(&self) -> bool {
        !self.is_online()
    }

    /// Record a connectivity change. Coming online triggers a sync.
    pub async fn set_online<K: ActionSink>(&self, online: bool, sink: &K) -> Option<SyncReport> {
        let was_online = self.online.swap(online, Ordering::AcqRel);
        debug!(online, was_online, "Connectivity changed");
        if online && !was_online {
            Some(self.sync(sink).await)
        } else {
            None
        }
    }

    // =========================================================================
    // Pending actions
    // =========================================================================

    /// Queue an action and persist the queue.
    #[instrument(skip(self, payload))]
    pub async fn enqueue(&self, kind: ActionKind, payload: serde_json::Value) -> PendingAction {
        let action = PendingAction {
            id: Uuid::new_v4(),
            kind,
            payload,
            timestamp: Utc::now(),
        };
        let mut pending = self.pending.lock().await;
        pending.push(action.clone());
        self.save_pending(&pending).await;
        debug!(action_id = %action.id, queued = pending.len(), "Queued action");
        action
    }

    /// Snapshot of the queue, oldest first.
    pub async fn pending(&self) -> Vec<PendingAction> {
        self.pending.lock().await.clone()
    }

    /// Replay queued actions through `sink`.
    ///
    /// Does nothing while offline or when the queue is empty. The queue is
    /// persisted empty before delivery starts, so a crash mid-sync drops
    /// rather than duplicates the in-progress batch.
    #[instrument(skip(self, sink))]
    pub async fn sync<K: ActionSink>(&self, sink: &K) -> SyncReport {
        let mut pending = self.pending.lock().await;
        if self.is_offline() || pending.is_empty() {
            return SyncReport::default();
        }

        let batch = std::mem::take(&mut *pending);
        self.save_pending(&pending).await;

        let mut report = SyncReport::default();
        for action in batch {
            match sink.deliver(&action).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(action_id = %action.id, kind = ?action.kind, error = %e, "Failed to sync action");
                    pending.push(action);
                    report.requeued += 1;
                }
            }
        }

        if !pending.is_empty() {
            self.save_pending(&pending).await;
        }
        info!(
            delivered = report.delivered,
            requeued = report.requeued,
            "Synced pending actions"
        );
        report
    }

    async fn save_pending(&self, pending: &[PendingAction]) {
        let result = match codec::encode(pending) {
            Ok(raw) => self.storage.set(&self.keys.pending_actions, &raw).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to save pending actions");
        }
    }

    // =========================================================================
    // Catalog cache
    // =========================================================================

    pub async fn cache_products(&self, products: &[Product]) {
        self.save_cached(PRODUCTS, products).await;
    }

    pub async fn cached_products(&self) -> Option<Vec<Product>> {
        self.load_cached(PRODUCTS).await
    }

    /// Cache the list of category names.
    pub async fn cache_categories(&self, categories: &[String]) {
        self.save_cached(CATEGORIES, categories).await;
    }

    pub async fn cached_categories(&self) -> Option<Vec<String>> {
        self.load_cached(CATEGORIES).await
    }

    async fn save_cached<T: Serialize>(&self, name: &str, items: &[T]) {
        let key = self.keys.offline(name);
        let result = match codec::encode(items) {
            Ok(raw) => self.storage.set(&key, &raw).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(key, error = %e, "Failed to cache offline data");
        }
    }

    async fn load_cached<T: DeserializeOwned>(&self, name: &str) -> Option<Vec<T>> {
        let key = self.keys.offline(name);
        match self.storage.get(&key).await {
            Ok(Some(raw)) => codec::decode(&raw)
                .inspect_err(|e| warn!(key, error = %e, "Discarding unreadable offline data"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read offline data");
                None
            }
        }
    }
}
