//! Command implementations.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use pocketshop_cart::{AuthError, FileStore, ShopState, StorageError};
use pocketshop_core::{Product, ProductId, QuantityError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::CliConfig;

pub mod account;
pub mod cart;
pub mod wishlist;

pub use account::AccountAction;
pub use cart::CartAction;
pub use wishlist::WishlistAction;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The data directory could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Sign-in or registration was rejected.
    #[error("Account error: {0}")]
    Auth(#[from] AuthError),

    /// A quantity argument is out of range.
    #[error("Invalid quantity: {0}")]
    Quantity(#[from] QuantityError),

    /// A product file could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadProduct {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A product file is not a valid catalog record.
    #[error("Invalid product record in {path}: {source}")]
    ParseProduct {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// File-backed shop state.
pub type State = ShopState<FileStore>;

/// Open the data directory and load saved state.
pub async fn open_state(config: &CliConfig) -> Result<State, CommandError> {
    let storage = FileStore::open(&config.data_dir).await?;
    tracing::debug!(dir = %config.data_dir.display(), "Using data directory");

    let state = ShopState::with_keys(Arc::new(storage), &config.keys);
    state.rehydrate().await;
    Ok(state)
}

/// Product attributes given on the command line.
#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Catalog product id
    #[arg(long)]
    pub id: i64,

    /// Product name
    #[arg(long)]
    pub name: String,

    /// Unit price
    #[arg(long)]
    pub price: Decimal,

    /// Price before discount
    #[arg(long)]
    pub original_price: Option<Decimal>,

    /// Category name
    #[arg(long, default_value = "")]
    pub category: String,

    /// Image URL
    #[arg(long)]
    pub image: Option<String>,
}

impl From<ProductArgs> for Product {
    fn from(args: ProductArgs) -> Self {
        let mut product = Self::new(ProductId::new(args.id), args.name, args.price)
            .with_category(args.category);
        product.original_price = args.original_price;
        product.image = args.image;
        product
    }
}

/// Read a catalog product record from a JSON file.
pub async fn read_product(path: PathBuf) -> Result<Product, CommandError> {
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| CommandError::ReadProduct {
            path: path.clone(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(|source| CommandError::ParseProduct { path, source })
}
