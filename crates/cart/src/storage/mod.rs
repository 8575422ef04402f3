//! Key-value persistence seam.
//!
//! The host platform supplies a [`KeyValueStore`]: asynchronous get/set/remove
//! over string keys holding string values. The stores in this crate depend on
//! it; it knows nothing about them.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local map, for tests and ephemeral sessions
//! - [`FileStore`] - one file per key under a data directory

use std::future::Future;

use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key is not usable by this backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend cannot serve requests right now.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored envelope was written by a newer schema.
    #[error("unsupported schema version {found} (supported up to {supported})")]
    UnsupportedVersion {
        /// Version found in storage.
        found: u32,
        /// Newest version this build can read.
        supported: u32,
    },
}

/// Asynchronous string key-value storage supplied by the host.
///
/// Removing an absent key succeeds.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete the value stored under `key`.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Storage keys used by the shop stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub cart: String,
    pub wishlist: String,
    pub user: String,
    pub pending_actions: String,
    /// Prefix for cached catalog data (`offline_products`, ...).
    pub offline_prefix: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            cart: "cart".to_owned(),
            wishlist: "wishlist".to_owned(),
            user: "user".to_owned(),
            pending_actions: "pendingActions".to_owned(),
            offline_prefix: "offline_".to_owned(),
        }
    }
}

impl StorageKeys {
    /// Key for a cached catalog entry.
    #[must_use]
    pub fn offline(&self, name: &str) -> String {
        format!("{}{name}", self.offline_prefix)
    }
}
