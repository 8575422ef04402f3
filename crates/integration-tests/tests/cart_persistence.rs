//! Cart persistence across simulated restarts.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use pocketshop_cart::codec;
use pocketshop_cart::{CartStore, KeyValueStore, LineItem, MemoryStore, StorageKeys};
use pocketshop_core::{Product, ProductId, Quantity};
use pocketshop_integration_tests::{FlakyStore, product};
use rust_decimal::Decimal;

fn qty(n: i64) -> Quantity {
    Quantity::new(n).unwrap()
}

async fn restart<S: KeyValueStore>(storage: Arc<S>) -> CartStore<S> {
    let store = CartStore::new(storage, &StorageKeys::default());
    store.rehydrate().await;
    store
}

// =============================================================================
// Restart Round-Trips
// =============================================================================

#[tokio::test]
async fn test_cart_and_wishlist_survive_restart() {
    let storage = Arc::new(MemoryStore::new());
    let store = restart(Arc::clone(&storage)).await;

    let detailed = Product {
        rating: Some(4.5),
        reviews: 128,
        discount: 20,
        features: vec!["Dishwasher safe".to_owned()],
        description: "A sturdy mug.".to_owned(),
        ..product(1, 25)
            .with_original_price(Decimal::new(3125, 2))
            .with_image("https://cdn.shop.test/mug.jpg")
    };
    store.add_to_cart(detailed.clone(), qty(2)).await;
    store.add_to_cart(product(2, 10), qty(1)).await;
    store.add_to_wishlist(detailed).await;
    store.add_to_wishlist(product(3, 99)).await;

    let restarted = restart(storage).await;
    assert_eq!(restarted.cart(), store.cart());
    assert_eq!(restarted.wishlist(), store.wishlist());
    assert_eq!(restarted.cart_total(), Decimal::new(60, 0));
    assert_eq!(restarted.cart_count(), 3);
}

#[tokio::test]
async fn test_cleared_cart_stays_cleared_after_restart() {
    let storage = Arc::new(MemoryStore::new());
    let store = restart(Arc::clone(&storage)).await;
    store.add_to_cart(product(1, 10), qty(3)).await;
    store.clear_cart().await;

    assert!(!storage.contains_key("cart"));
    let restarted = restart(storage).await;
    assert!(restarted.cart().is_empty());
    assert_eq!(restarted.cart_count(), 0);
}

#[tokio::test]
async fn test_checkout_scenario_after_restart() {
    let storage = Arc::new(MemoryStore::new());
    let store = restart(Arc::clone(&storage)).await;
    store.add_to_cart(product(1, 25), qty(2)).await;
    store.add_to_cart(product(2, 10), qty(1)).await;

    let restarted = restart(Arc::clone(&storage)).await;
    assert_eq!(restarted.cart_total(), Decimal::new(60, 0));
    assert_eq!(restarted.cart_count(), 3);

    restarted.remove_from_cart(ProductId::new(1)).await;
    let again = restart(storage).await;
    assert_eq!(again.cart_total(), Decimal::new(10, 0));
    assert_eq!(again.cart_count(), 1);
}

#[tokio::test]
async fn test_legacy_layout_is_upgraded_on_next_write() {
    let storage = Arc::new(MemoryStore::new());
    let legacy = r#"[{"id":7,"name":"Lamp","price":30,"originalPrice":45,"category":"Home","quantity":1}]"#;
    storage.set("cart", legacy).await.unwrap();

    let store = restart(Arc::clone(&storage)).await;
    assert_eq!(store.cart_count(), 1);

    store.add_to_cart(product(8, 5), qty(1)).await;
    let raw = storage.peek("cart").unwrap();
    assert!(raw.starts_with(r#"{"version":1,"#));
    let saved: Vec<LineItem> = codec::decode(&raw).unwrap();
    assert_eq!(saved.len(), 2);
}

// =============================================================================
// Storage Faults
// =============================================================================

#[tokio::test]
async fn test_read_fault_starts_empty() {
    let storage = Arc::new(FlakyStore::new());
    let seeded = restart(Arc::clone(&storage)).await;
    seeded.add_to_cart(product(1, 10), qty(1)).await;

    storage.fail_reads(true);
    let restarted = restart(storage).await;
    assert!(restarted.cart().is_empty());
    assert!(restarted.wishlist().is_empty());
}

#[tokio::test]
async fn test_write_fault_keeps_memory_state() {
    let storage = Arc::new(FlakyStore::new());
    let store = restart(Arc::clone(&storage)).await;
    store.add_to_cart(product(1, 10), qty(1)).await;

    storage.fail_writes(true);
    store.add_to_cart(product(1, 10), qty(4)).await;
    assert_eq!(store.cart_count(), 5);

    // The store still holds the last successful write.
    storage.fail_writes(false);
    let restarted = restart(Arc::clone(&storage)).await;
    assert_eq!(restarted.cart_count(), 1);

    // The next successful write carries the full in-memory state.
    store.add_to_wishlist(product(2, 1)).await;
    store.update_quantity(ProductId::new(1), 6).await;
    let restarted = restart(storage).await;
    assert_eq!(restarted.cart_count(), 6);
}

// =============================================================================
// Concurrent Mutations
// =============================================================================

#[tokio::test]
async fn test_unawaited_mutations_never_persist_stale_state() {
    let storage = Arc::new(FlakyStore::new());
    storage.set_write_delay(Duration::from_millis(20));
    let store = Arc::new(restart(Arc::clone(&storage)).await);

    let mut handles = Vec::new();
    for id in 1..=8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.add_to_cart(product(id, 1), Quantity::ONE).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    store.flush().await;

    assert_eq!(store.cart().len(), 8);
    let restarted = restart(Arc::clone(&storage)).await;
    assert_eq!(restarted.cart(), store.cart());
    // Superseded snapshots are skipped rather than written.
    assert!(storage.write_count() < 8);
}

#[tokio::test]
async fn test_interleaved_add_and_clear_persist_final_state() {
    let storage = Arc::new(FlakyStore::new());
    storage.set_write_delay(Duration::from_millis(10));
    let store = restart(Arc::clone(&storage)).await;

    tokio::join!(
        store.add_to_cart(product(1, 10), qty(2)),
        store.clear_cart(),
        store.add_to_cart(product(2, 10), qty(1)),
    );

    let restarted = restart(storage).await;
    assert_eq!(restarted.cart(), store.cart());
    assert_eq!(restarted.cart_count(), 1);
    assert_eq!(restarted.cart()[0].product_id(), ProductId::new(2));
}

#[tokio::test]
async fn test_cart_and_wishlist_writes_are_independent() {
    let storage = Arc::new(FlakyStore::new());
    let store = restart(Arc::clone(&storage)).await;

    store.add_to_cart(product(1, 10), qty(1)).await;
    store.add_to_wishlist(product(2, 10)).await;
    store.add_to_wishlist(product(2, 10)).await;

    assert_eq!(storage.write_log(), vec!["cart", "wishlist"]);
}
