//! Cart and wishlist state with write-through persistence.
//!
//! [`CartStore`] owns two independent collections:
//!
//! - the cart, one [`LineItem`] per product id
//! - the wishlist, one [`Product`] snapshot per product id
//!
//! Both keep insertion order for display. Every change rewrites the whole
//! collection under its storage key through a single-flight write queue, so
//! the newest snapshot is always the one left in storage. The store never returns
//! storage errors: rehydration falls back to empty collections and failed
//! writes are logged.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pocketshop_core::{Product, ProductId, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::codec;
use crate::storage::{KeyValueStore, StorageKeys};
use crate::write_queue::{Ticket, WriteOp, WriteQueue};

/// A product in the cart with its quantity.
///
/// Serialized as a flat record: the product attributes plus `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: Quantity,
}

impl LineItem {
    #[must_use]
    pub const fn new(product: Product, quantity: Quantity) -> Self {
        Self { product, quantity }
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity, or `None` if that overflows `Decimal`.
    #[must_use]
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.product
            .price
            .checked_mul(Decimal::from(self.quantity.get()))
    }

    /// Unit price times quantity, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product
            .price
            .saturating_mul(Decimal::from(self.quantity.get()))
    }
}

#[derive(Debug, Default)]
struct Collections {
    cart: Vec<LineItem>,
    wishlist: Vec<Product>,
}

impl Collections {
    fn line_mut(&mut self, id: ProductId) -> Option<&mut LineItem> {
        self.cart.iter_mut().find(|line| line.product_id() == id)
    }

    fn remove_line(&mut self, id: ProductId) -> bool {
        let before = self.cart.len();
        self.cart.retain(|line| line.product_id() != id);
        self.cart.len() != before
    }
}

/// Cart and wishlist store.
///
/// Construct one per application and share it by reference (or through
/// [`crate::ShopState`]).
///
/// # Example
///
/// ```rust
/// # use std::sync::Arc;
/// # use pocketshop_cart::{CartStore, MemoryStore, StorageKeys};
/// # use pocketshop_core::{Product, ProductId, Quantity};
/// # use rust_decimal::Decimal;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = CartStore::new(Arc::new(MemoryStore::new()), &StorageKeys::default());
/// store.rehydrate().await;
///
/// let mug = Product::new(ProductId::new(1), "Mug", Decimal::new(25, 0));
/// store.add_to_cart(mug, Quantity::new(2).unwrap()).await;
///
/// assert_eq!(store.cart_total(), Decimal::new(50, 0));
/// assert_eq!(store.cart_count(), 2);
/// # }
/// ```
pub struct CartStore<S> {
    storage: Arc<S>,
    state: Mutex<Collections>,
    cart_writes: WriteQueue,
    wishlist_writes: WriteQueue,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create an empty store. Call [`rehydrate`](Self::rehydrate) to load
    /// saved state.
    #[must_use]
    pub fn new(storage: Arc<S>, keys: &StorageKeys) -> Self {
        Self {
            storage,
            state: Mutex::new(Collections::default()),
            cart_writes: WriteQueue::new(keys.cart.clone()),
            wishlist_writes: WriteQueue::new(keys.wishlist.clone()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Rehydration
    // =========================================================================

    /// Load the saved cart and wishlist, replacing the in-memory collections.
    ///
    /// A missing key, failed read, or undecodable value leaves that
    /// collection empty.
    #[instrument(skip(self))]
    pub async fn rehydrate(&self) {
        let (cart, wishlist) = tokio::join!(
            self.load::<LineItem>(self.cart_writes.key()),
            self.load::<Product>(self.wishlist_writes.key()),
        );
        let cart = merge_duplicate_lines(cart);
        let wishlist = dedupe_products(wishlist);

        info!(
            cart_lines = cart.len(),
            wishlist_entries = wishlist.len(),
            "Rehydrated cart state"
        );

        let mut state = self.lock();
        state.cart = cart;
        state.wishlist = wishlist;
    }

    async fn load<T: serde::de::DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.storage.get(key).await {
            Ok(Some(raw)) => codec::decode(&raw).unwrap_or_else(|e| {
                warn!(key, error = %e, "Discarding unreadable saved collection");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read saved collection");
                Vec::new()
            }
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add `quantity` of `product` to the cart.
    ///
    /// If the product is already in the cart its quantity grows (saturating
    /// at `u32::MAX`); the stored snapshot is kept as first added.
    #[instrument(skip(self, product, quantity), fields(product_id = %product.id, quantity = %quantity))]
    pub async fn add_to_cart(&self, product: Product, quantity: Quantity) {
        let ticket = {
            let mut state = self.lock();
            if let Some(line) = state.line_mut(product.id) {
                line.quantity = line.quantity.saturating_add(quantity);
            } else {
                state.cart.push(LineItem::new(product, quantity));
            }
            self.stage_cart(&state)
        };
        self.persist_cart(ticket).await;
    }

    /// Add a single unit of `product` to the cart.
    pub async fn add_one_to_cart(&self, product: Product) {
        self.add_to_cart(product, Quantity::ONE).await;
    }

    /// Remove the line for `id`. Does nothing if it is not in the cart.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, id: ProductId) {
        let ticket = {
            let mut state = self.lock();
            if !state.remove_line(id) {
                debug!("Product not in cart");
            }
            self.stage_cart(&state)
        };
        self.persist_cart(ticket).await;
    }

    /// Set the quantity of the line for `id`.
    ///
    /// A quantity of zero or less removes the line. Values above `u32::MAX`
    /// saturate. Does nothing if the product is not in the cart.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, id: ProductId, quantity: i64) {
        let ticket = {
            let mut state = self.lock();
            match Quantity::saturating_from(quantity) {
                Some(quantity) => match state.line_mut(id) {
                    Some(line) => line.quantity = quantity,
                    None => debug!("Product not in cart"),
                },
                None => {
                    if state.remove_line(id) {
                        debug!("Quantity dropped to zero, removed line");
                    }
                }
            }
            self.stage_cart(&state)
        };
        self.persist_cart(ticket).await;
    }

    /// Empty the cart and delete the saved cart key.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) {
        let ticket = {
            let mut state = self.lock();
            state.cart.clear();
            self.cart_writes.stage(WriteOp::Remove)
        };
        self.persist_cart(ticket).await;
    }

    /// Snapshot of the cart in insertion order.
    #[must_use]
    pub fn cart(&self) -> Vec<LineItem> {
        self.lock().cart.clone()
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn line_item(&self, id: ProductId) -> Option<LineItem> {
        self.lock()
            .cart
            .iter()
            .find(|line| line.product_id() == id)
            .cloned()
    }

    /// Sum of unit price times quantity over all lines. Not rounded.
    ///
    /// A total beyond what `Decimal` can hold saturates at `Decimal::MAX`
    /// (or `MIN`) and logs a warning.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        let state = self.lock();
        let exact = state
            .cart
            .iter()
            .try_fold(Decimal::ZERO, |total, line| {
                total.checked_add(line.checked_line_total()?)
            });
        exact.unwrap_or_else(|| {
            warn!(lines = state.cart.len(), "Cart total overflowed, saturating");
            state
                .cart
                .iter()
                .fold(Decimal::ZERO, |total, line| total.saturating_add(line.line_total()))
        })
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        self.lock()
            .cart
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    fn stage_cart(&self, state: &Collections) -> Ticket {
        match codec::encode(&state.cart) {
            Ok(raw) => self.cart_writes.stage(WriteOp::Set(raw)),
            // Leave the last good write in place.
            Err(e) => {
                warn!(error = %e, "Failed to encode cart");
                Ticket::SATISFIED
            }
        }
    }

    async fn persist_cart(&self, ticket: Ticket) {
        self.cart_writes.persist(self.storage.as_ref(), ticket).await;
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Save `product` to the wishlist unless one with the same id is there.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_wishlist(&self, product: Product) {
        let ticket = {
            let mut state = self.lock();
            if state.wishlist.iter().any(|entry| entry.id == product.id) {
                debug!("Product already in wishlist");
                return;
            }
            state.wishlist.push(product);
            self.stage_wishlist(&state)
        };
        self.persist_wishlist(ticket).await;
    }

    /// Remove the wishlist entry for `id`. Does nothing if it is absent.
    #[instrument(skip(self))]
    pub async fn remove_from_wishlist(&self, id: ProductId) {
        let ticket = {
            let mut state = self.lock();
            state.wishlist.retain(|entry| entry.id != id);
            self.stage_wishlist(&state)
        };
        self.persist_wishlist(ticket).await;
    }

    /// Snapshot of the wishlist in insertion order.
    #[must_use]
    pub fn wishlist(&self) -> Vec<Product> {
        self.lock().wishlist.clone()
    }

    #[must_use]
    pub fn is_in_wishlist(&self, id: ProductId) -> bool {
        self.lock().wishlist.iter().any(|entry| entry.id == id)
    }

    fn stage_wishlist(&self, state: &Collections) -> Ticket {
        match codec::encode(&state.wishlist) {
            Ok(raw) => self.wishlist_writes.stage(WriteOp::Set(raw)),
            Err(e) => {
                warn!(error = %e, "Failed to encode wishlist");
                Ticket::SATISFIED
            }
        }
    }

    async fn persist_wishlist(&self, ticket: Ticket) {
        self.wishlist_writes
            .persist(self.storage.as_ref(), ticket)
            .await;
    }

    /// Wait for every write staged so far to complete.
    pub async fn flush(&self) {
        let storage = self.storage.as_ref();
        tokio::join!(
            self.cart_writes.flush(storage),
            self.wishlist_writes.flush(storage)
        );
    }
}

/// Fold repeated product ids into the first line, summing quantities.
fn merge_duplicate_lines(lines: Vec<LineItem>) -> Vec<LineItem> {
    let mut merged: Vec<LineItem> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged
            .iter_mut()
            .find(|existing| existing.product_id() == line.product_id())
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            }
            None => merged.push(line),
        }
    }
    merged
}

fn dedupe_products(products: Vec<Product>) -> Vec<Product> {
    let mut deduped: Vec<Product> = Vec::with_capacity(products.len());
    for product in products {
        if !deduped.iter().any(|existing| existing.id == product.id) {
            deduped.push(product);
        }
    }
    deduped
}
