//! Wishlist commands.

use std::path::PathBuf;

use clap::Subcommand;
use pocketshop_core::ProductId;

use super::{CommandError, ProductArgs, State, read_product};
use crate::output;

#[derive(Debug, Subcommand)]
pub enum WishlistAction {
    /// Show saved products
    Show,
    /// Save a product given on the command line
    Add {
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Save a product from a catalog JSON record
    AddJson {
        /// Path to the product record
        path: PathBuf,
    },
    /// Remove a saved product
    Remove {
        #[arg(long)]
        id: i64,
    },
}

pub async fn run(state: &State, action: WishlistAction) -> Result<(), CommandError> {
    let cart = state.cart();
    match action {
        WishlistAction::Show => {}
        WishlistAction::Add { product } => cart.add_to_wishlist(product.into()).await,
        WishlistAction::AddJson { path } => cart.add_to_wishlist(read_product(path).await?).await,
        WishlistAction::Remove { id } => cart.remove_from_wishlist(ProductId::new(id)).await,
    }

    output::wishlist(&cart.wishlist());
    Ok(())
}
