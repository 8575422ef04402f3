//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! pocketshop cart add --id 1 --name "Mug" --price 12.50 -q 2
//! pocketshop cart add-json product.json
//! pocketshop cart set --id 1 --quantity 0   # removes the line
//! pocketshop cart remove --id 1
//! pocketshop cart clear
//! ```

use std::path::PathBuf;

use clap::Subcommand;
use pocketshop_core::{ProductId, Quantity};
use tracing::info;

use super::{CommandError, ProductArgs, State, read_product};
use crate::output;

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show cart lines, item count, and total
    Show,
    /// Add a product given on the command line
    Add {
        #[command(flatten)]
        product: ProductArgs,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Add a product from a catalog JSON record
    AddJson {
        /// Path to the product record
        path: PathBuf,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Remove a product's line
    Remove {
        #[arg(long)]
        id: i64,
    },
    /// Set a line's quantity (zero or less removes it)
    Set {
        #[arg(long)]
        id: i64,

        #[arg(short, long, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

pub async fn run(state: &State, action: CartAction) -> Result<(), CommandError> {
    let cart = state.cart();
    match action {
        CartAction::Show => {}
        CartAction::Add { product, quantity } => {
            let quantity = Quantity::new(quantity)?;
            cart.add_to_cart(product.into(), quantity).await;
        }
        CartAction::AddJson { path, quantity } => {
            let quantity = Quantity::new(quantity)?;
            let product = read_product(path).await?;
            cart.add_to_cart(product, quantity).await;
        }
        CartAction::Remove { id } => cart.remove_from_cart(ProductId::new(id)).await,
        CartAction::Set { id, quantity } => {
            cart.update_quantity(ProductId::new(id), quantity).await;
        }
        CartAction::Clear => {
            cart.clear_cart().await;
            info!("Cart cleared");
        }
    }

    output::cart(&cart.cart(), cart.cart_count(), cart.cart_total());
    Ok(())
}
