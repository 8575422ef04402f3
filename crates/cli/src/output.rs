//! Plain-text rendering of shop state to stdout.

#![allow(clippy::print_stdout)]

use pocketshop_cart::{LineItem, PendingAction, User};
use pocketshop_core::{Price, Product};
use rust_decimal::Decimal;

pub fn cart(lines: &[LineItem], count: u64, total: Decimal) {
    if lines.is_empty() {
        println!("Cart is empty");
        return;
    }
    for line in lines {
        println!(
            "{:>6}  {:<32} {:>4} x {:>10} = {:>10}{}",
            line.product.id.as_i64(),
            line.product.name,
            line.quantity,
            Price::new(line.product.price).display(),
            Price::new(line.line_total()).display(),
            was_price(&line.product),
        );
    }
    println!("Items: {count}");
    println!("Total: {}", Price::new(total).display());
}

pub fn wishlist(products: &[Product]) {
    if products.is_empty() {
        println!("Wishlist is empty");
        return;
    }
    for product in products {
        println!(
            "{:>6}  {:<32} {:>10}{}",
            product.id.as_i64(),
            product.name,
            Price::new(product.price).display(),
            was_price(product),
        );
    }
}

pub fn user(user: Option<&User>) {
    match user {
        Some(user) => println!("Signed in as {} <{}>", user.name, user.email),
        None => println!("Not signed in"),
    }
}

pub fn pending_actions(actions: &[PendingAction]) {
    if actions.is_empty() {
        println!("No pending actions");
        return;
    }
    for action in actions {
        println!(
            "{}  {:?}  {}",
            action.timestamp.to_rfc3339(),
            action.kind,
            action.id
        );
    }
}

fn was_price(product: &Product) -> String {
    match product.original_price {
        Some(original) if product.is_discounted() => {
            format!("  (was {})", Price::new(original).display())
        }
        _ => String::new(),
    }
}
