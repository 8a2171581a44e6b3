//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! shopfront cart show
//! shopfront cart add 64f1c0 -q 2 --edition Signed
//! shopfront cart update 64f1c0 -q 1 --edition Signed
//! shopfront cart remove 64f1c0 --edition Signed
//! shopfront cart clear
//! ```
//!
//! Requests carry the token stored by `shopfront auth login`. Outcome
//! notifications (e.g. "Item added to cart") are logged as they happen.

use shopfront_client::Storefront;
use shopfront_core::{Cart, ProductId};

use super::CommandError;

fn log_cart(cart: &Cart) {
    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for item in &cart.items {
        match &item.edition_name {
            Some(edition) => tracing::info!("  {} x {} ({})", item.quantity, item.product_id, edition),
            None => tracing::info!("  {} x {}", item.quantity, item.product_id),
        }
    }
    tracing::info!("{} item(s), total {}", cart.item_count(), cart.total_price);
}

/// Fetch and show the cart.
pub async fn show(storefront: &Storefront) -> Result<(), CommandError> {
    let cart = storefront.cart();
    cart.refresh_cart().await;

    // A failed load has already been reported through the notifier.
    let current = cart.cart().ok_or(CommandError::CartUnavailable)?;
    log_cart(&current);
    Ok(())
}

pub async fn add(
    storefront: &Storefront,
    product_id: String,
    quantity: u32,
    edition: Option<String>,
) -> Result<(), CommandError> {
    let cart = storefront
        .cart()
        .add_to_cart(ProductId::new(product_id), quantity, edition)
        .await?;
    log_cart(&cart);
    Ok(())
}

pub async fn update(
    storefront: &Storefront,
    product_id: String,
    quantity: u32,
    edition: Option<String>,
) -> Result<(), CommandError> {
    let cart = storefront
        .cart()
        .update_cart_item(ProductId::new(product_id), quantity, edition)
        .await?;
    log_cart(&cart);
    Ok(())
}

pub async fn remove(
    storefront: &Storefront,
    product_id: String,
    edition: Option<String>,
) -> Result<(), CommandError> {
    let cart = storefront
        .cart()
        .remove_cart_item(ProductId::new(product_id), edition)
        .await?;
    log_cart(&cart);
    Ok(())
}

pub async fn clear(storefront: &Storefront) -> Result<(), CommandError> {
    storefront.cart().clear_cart().await?;
    Ok(())
}
