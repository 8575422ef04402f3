//! Pocketshop cart library.
//!
//! Client-side shopping state with write-through persistence to a host
//! key-value store:
//!
//! - [`cart`] - Cart line items and wishlist entries ([`CartStore`])
//! - [`auth`] - Mock account session ([`AuthStore`])
//! - [`offline`] - Catalog cache and pending action queue ([`OfflineStore`])
//! - [`state`] - All of the above composed over one store ([`ShopState`])
//! - [`storage`] - The [`KeyValueStore`] seam plus memory and file backends
//!
//! # Persistence
//!
//! Every mutation rewrites the whole affected collection. Writes for one key
//! go through a single-flight queue, so at most one is in flight and the
//! newest state always lands last. Collections are stored in a versioned
//! JSON envelope (see [`codec`]).
//!
//! Storage failures never reach callers of the cart: reads fall back to empty
//! collections and failed writes are logged while the in-memory state stays
//! authoritative for the session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod codec;
pub mod offline;
pub mod state;
pub mod storage;
mod write_queue;

pub use auth::{AuthError, AuthStore, User};
pub use cart::{CartStore, LineItem};
pub use offline::{ActionKind, ActionSink, OfflineStore, PendingAction, SyncReport};
pub use state::ShopState;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageKeys};
