//! Order domain types.
//!
//! Orders are immutable once written: item prices are copies taken at
//! checkout, not references to the live catalog price.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cartwright_core::{
    CartId, OrderId, OrderItemId, OrderStatus, Price, ProductId, Quantity, UserId,
};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    /// Sum of all line totals at checkout time.
    pub total_amount: Price,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One purchased line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// Unit price at time of purchase.
    pub price: Price,
}

/// An order together with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// A line to copy into a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub price: Price,
}

/// Everything the checkout write phase needs, computed by the read phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Cart whose items are consumed by this order.
    pub cart_id: CartId,
    pub user_id: UserId,
    pub total_amount: Price,
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub lines: Vec<NewOrderLine>,
}

impl NewOrder {
    /// Whether `consumed` (the cart lines actually removed) is exactly the
    /// set of lines this order was priced from. Sorts `consumed` in place.
    #[must_use]
    pub fn matches_lines(&self, consumed: &mut [(ProductId, Quantity)]) -> bool {
        let mut expected: Vec<(ProductId, Quantity)> = self
            .lines
            .iter()
            .map(|l| (l.product_id, l.quantity))
            .collect();
        expected.sort_unstable();
        consumed.sort_unstable();
        expected == consumed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order_with(lines: &[(i32, i32)]) -> NewOrder {
        NewOrder {
            cart_id: CartId::new(1),
            user_id: UserId::new(1),
            total_amount: Price::ZERO,
            shipping_address: None,
            billing_address: None,
            lines: lines
                .iter()
                .map(|&(p, q)| NewOrderLine {
                    product_id: ProductId::new(p),
                    quantity: Quantity::new(q).unwrap(),
                    price: Price::from_cents(100),
                })
                .collect(),
        }
    }

    fn consumed(lines: &[(i32, i32)]) -> Vec<(ProductId, Quantity)> {
        lines
            .iter()
            .map(|&(p, q)| (ProductId::new(p), Quantity::new(q).unwrap()))
            .collect()
    }

    #[test]
    fn test_matches_lines_ignores_order() {
        let order = order_with(&[(1, 2), (2, 1)]);
        assert!(order.matches_lines(&mut consumed(&[(2, 1), (1, 2)])));
    }

    #[test]
    fn test_matches_lines_detects_changes() {
        let order = order_with(&[(1, 2), (2, 1)]);
        assert!(!order.matches_lines(&mut consumed(&[(1, 3), (2, 1)])));
        assert!(!order.matches_lines(&mut consumed(&[(1, 2)])));
        assert!(!order.matches_lines(&mut consumed(&[(1, 2), (2, 1), (3, 1)])));
    }
}
