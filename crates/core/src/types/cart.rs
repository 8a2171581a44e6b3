//! Cart wire types and the mutation payloads sent to the cart endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CartId, Price, ProductId, UserId};

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Edition/variant name when the product has several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition_name: Option<String>,
    /// Product details the server denormalizes into the line (title, price, image, ...).
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// The user's cart, as last reported by the server.
///
/// Fields this client does not interpret are kept in `extra` so a locally
/// cleared cart still carries everything the server sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Cart {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Empty the cart locally, keeping every other field.
    pub fn clear_items(&mut self) {
        self.items.clear();
        self.total_price = Price::ZERO;
    }
}

/// Payload for adding or updating a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition_name: Option<String>,
}

/// Payload for removing a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRemoval {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition_name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Cart {
        serde_json::from_str(
            r#"{
                "_id": "c1",
                "userId": "u1",
                "items": [
                    {"productId": "p1", "quantity": 2, "editionName": "Deluxe", "title": "Book"},
                    {"productId": "p2", "quantity": 1}
                ],
                "totalPrice": 42.5,
                "currency": "USD"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_cart() {
        let cart = sample();
        assert_eq!(cart.id, Some(CartId::new("c1")));
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total_price, Price::from_cents(4250));
        assert_eq!(cart.extra["currency"], "USD");
        assert_eq!(cart.items[0].details["title"], "Book");
    }

    #[test]
    fn test_clear_items_keeps_other_fields() {
        let mut cart = sample();
        cart.clear_items();

        assert!(cart.is_empty());
        assert!(cart.total_price.is_zero());
        assert_eq!(cart.user_id, Some(UserId::new("u1")));
        assert_eq!(cart.extra["currency"], "USD");
    }

    #[test]
    fn test_input_omits_missing_edition() {
        let input = CartItemInput {
            product_id: ProductId::new("p1"),
            quantity: 3,
            edition_name: None,
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            serde_json::json!({"productId": "p1", "quantity": 3})
        );
    }
}
