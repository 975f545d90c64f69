//! Checkout: turn a cart into an order.
//!
//! The read phase (cart, lines, prices, address) runs outside any
//! transaction. The write phase is a single [`OrderStore::place_order`] call
//! that inserts the order and its items and empties the cart atomically, and
//! refuses to commit if the cart was emptied or changed in the meantime.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use cartwright_core::{CartId, Price, UserId};

use super::ShopError;
use crate::db::{CartStore, OrderStore, PlaceOrder, Stores, UserStore};
use crate::models::{NewOrder, NewOrderLine, Order};

/// Cart to order conversion.
#[derive(Clone)]
pub struct CheckoutService {
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
}

impl CheckoutService {
    /// Create a checkout service over the given stores.
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            carts: Arc::clone(&stores.carts),
            orders: Arc::clone(&stores.orders),
            users: Arc::clone(&stores.users),
        }
    }

    /// Place an order for every line in `cart_id` at current prices.
    ///
    /// The order starts `Pending`, carries the user's postal address as both
    /// shipping and billing address, and the cart is left empty.
    ///
    /// # Errors
    ///
    /// - `ShopError::NotFound` if the cart (or its owner) does not exist
    /// - `ShopError::Forbidden` if the cart belongs to another user
    /// - `ShopError::EmptyCart` if there is nothing to buy, including when a
    ///   concurrent checkout emptied the cart first
    /// - `ShopError::Conflict` if the cart changed between pricing and writing
    /// - `ShopError::StoreUnavailable` if the store fails; nothing is written
    #[instrument(skip(self), fields(cart_id = %cart_id, user_id = %user_id))]
    pub async fn checkout(&self, cart_id: CartId, user_id: UserId) -> Result<Order, ShopError> {
        let cart = self
            .carts
            .cart_by_id(cart_id)
            .await?
            .ok_or(ShopError::NotFound("cart"))?;
        if cart.user_id != user_id {
            warn!(owner = %cart.user_id, "Checkout of another user's cart");
            return Err(ShopError::Forbidden("cart belongs to another user"));
        }

        let lines = self.carts.lines(cart_id).await?;
        if lines.is_empty() {
            return Err(ShopError::EmptyCart);
        }

        let total_amount: Price = lines.iter().map(|l| l.line_total).sum();

        let user = self
            .users
            .user_by_id(user_id)
            .await?
            .ok_or(ShopError::NotFound("user"))?;
        let address = user.address.one_line();

        let order = NewOrder {
            cart_id,
            user_id,
            total_amount,
            shipping_address: address.clone(),
            billing_address: address,
            lines: lines
                .iter()
                .map(|l| NewOrderLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    price: l.unit_price,
                })
                .collect(),
        };

        match self.orders.place_order(&order).await? {
            PlaceOrder::Placed(placed) => {
                info!(
                    order_id = %placed.id,
                    total = %placed.total_amount,
                    items = order.lines.len(),
                    "Order placed"
                );
                Ok(placed)
            }
            PlaceOrder::CartEmptied => {
                warn!("Cart emptied before checkout could commit");
                Err(ShopError::EmptyCart)
            }
            PlaceOrder::CartChanged => {
                warn!("Cart changed during checkout");
                Err(ShopError::Conflict(
                    "cart changed during checkout, please review and retry".to_owned(),
                ))
            }
        }
    }
}
