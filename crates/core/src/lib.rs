//! Pocketshop Core - Shared types library.
//!
//! This crate provides common types used across all Pocketshop components:
//! - `cart` - Cart, wishlist, session, and offline state with persistent storage sync
//! - `cli` - Command-line front end over a file-backed store
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, quantities, and the
//!   product snapshot copied into carts and wishlists

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
