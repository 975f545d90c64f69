//! Catalog product types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cartwright_core::{Price, ProductId};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: Option<String>,
    /// Category slug used for browsing (e.g. `"kitchen"`).
    pub category: String,
    /// Current unit price. Orders copy this at checkout.
    pub price: Price,
    /// Units on hand. Informational only, checkout does not decrement it.
    pub stock_quantity: i32,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a product (used by catalog seeding).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub price: Price,
    #[serde(default)]
    pub stock_quantity: i32,
}
