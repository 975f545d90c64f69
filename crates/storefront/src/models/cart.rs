//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cartwright_core::{CartId, CartItemId, Price, ProductId, Quantity, UserId};

/// A user's cart. Each user owns at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// Owner of the cart.
    pub user_id: UserId,
    /// When the cart was first created.
    pub created_at: DateTime<Utc>,
}

/// A single (cart, product) line. The pair is unique within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub added_at: DateTime<Utc>,
}

/// A cart line joined with the product's current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: Quantity,
    pub unit_price: Price,
    pub line_total: Price,
}

impl CartLine {
    /// Build a line, computing its total from the unit price.
    #[must_use]
    pub fn new(product_id: ProductId, name: String, quantity: Quantity, unit_price: Price) -> Self {
        Self {
            product_id,
            name,
            quantity,
            unit_price,
            line_total: unit_price.line_total(quantity),
        }
    }
}

/// A cart with its priced lines, as shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub cart: Cart,
    pub items: Vec<CartLine>,
    pub item_count: i64,
    pub subtotal: Price,
}

impl CartView {
    /// Assemble a view from a cart and its lines.
    #[must_use]
    pub fn new(cart: Cart, items: Vec<CartLine>) -> Self {
        let item_count = items.iter().map(|l| i64::from(l.quantity.get())).sum();
        let subtotal = items.iter().map(|l| l.line_total).sum();
        Self {
            cart,
            items,
            item_count,
            subtotal,
        }
    }
}
