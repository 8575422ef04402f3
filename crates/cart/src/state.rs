//! Application state shared across views.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::auth::AuthStore;
use crate::cart::CartStore;
use crate::offline::OfflineStore;
use crate::storage::{KeyValueStore, StorageKeys};

/// Application state shared across all views.
///
/// Built once at startup over the host's storage and handed to whatever
/// needs it. Cheaply cloneable via `Arc`.
pub struct ShopState<S> {
    inner: Arc<ShopStateInner<S>>,
}

struct ShopStateInner<S> {
    storage: Arc<S>,
    cart: CartStore<S>,
    auth: AuthStore<S>,
    offline: OfflineStore<S>,
}

impl<S> Clone for ShopState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: KeyValueStore> ShopState<S> {
    /// Create state over `storage` with the default keys.
    #[must_use]
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_keys(storage, &StorageKeys::default())
    }

    /// Create state over `storage` with custom keys.
    #[must_use]
    pub fn with_keys(storage: Arc<S>, keys: &StorageKeys) -> Self {
        Self {
            inner: Arc::new(ShopStateInner {
                cart: CartStore::new(Arc::clone(&storage), keys),
                auth: AuthStore::new(Arc::clone(&storage), keys),
                offline: OfflineStore::new(Arc::clone(&storage), keys),
                storage,
            }),
        }
    }

    /// Load every saved collection. Call once at startup.
    #[instrument(skip(self))]
    pub async fn rehydrate(&self) {
        tokio::join!(
            self.inner.cart.rehydrate(),
            self.inner.auth.load(),
            self.inner.offline.load(),
        );
        info!("Shop state ready");
    }

    /// Sign out and clear the cart.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        tokio::join!(self.inner.auth.logout(), self.inner.cart.clear_cart());
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore<S> {
        &self.inner.cart
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore<S> {
        &self.inner.auth
    }

    #[must_use]
    pub fn offline(&self) -> &OfflineStore<S> {
        &self.inner.offline
    }

    /// The underlying key-value store.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.inner.storage
    }
}
