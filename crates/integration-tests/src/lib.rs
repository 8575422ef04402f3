//! Shared fixtures for Pocketshop integration tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocketshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Restart simulation and write ordering
//! - `file_store` - State on disk through [`FileStore`]
//! - `shop_state` - Session, offline queue, and logout flows

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use pocketshop_cart::{KeyValueStore, MemoryStore, StorageError};
use pocketshop_core::{Product, ProductId};
use rust_decimal::Decimal;

pub use pocketshop_cart::FileStore;

/// Build a product with a whole-number price.
#[must_use]
pub fn product(id: i64, price: i64) -> Product {
    Product::new(ProductId::new(id), format!("Product {id}"), Decimal::new(price, 0))
        .with_category("Test")
}

/// A [`MemoryStore`] wrapper that can fail on demand and slows writes down
/// so concurrent callers overlap.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    write_delay_ms: AtomicU64,
    writes: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl FlakyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_write_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.write_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Number of set/remove calls that reached the store.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Keys written, in order.
    #[must_use]
    pub fn write_log(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    async fn before_write(&self, key: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.log
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(key.to_owned());
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("simulated write fault".to_owned()));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("simulated read fault".to_owned()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.before_write(key).await?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.before_write(key).await?;
        self.inner.remove(key).await
    }
}
