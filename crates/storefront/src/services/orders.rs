//! Order history.

use std::sync::Arc;

use cartwright_core::{OrderId, UserId};

use super::ShopError;
use crate::db::{OrderStore, Stores};
use crate::models::{Order, OrderDetail};

/// Read-only access to a user's orders.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
}

impl OrderService {
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            orders: Arc::clone(&stores.orders),
        }
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::StoreUnavailable` if the store fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, ShopError> {
        Ok(self.orders.orders_for_user(user_id).await?)
    }

    /// One of the user's orders with its items.
    ///
    /// Another user's order is reported as absent.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::StoreUnavailable` if the store fails.
    pub async fn get_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<OrderDetail>, ShopError> {
        Ok(self.orders.order_for_user(user_id, order_id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::{CartService, CheckoutService};
    use crate::test_support::Fixture;

    async fn place(fx: &Fixture, user_id: UserId, quantity: i64) -> Order {
        let carts = CartService::new(&fx.stores);
        carts.add_item(user_id, fx.mug.id, quantity).await.unwrap();
        let cart = carts.get_cart(user_id).await.unwrap().unwrap();
        CheckoutService::new(&fx.stores)
            .checkout(cart.id, user_id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_orders_are_scoped_to_owner() {
        let fx = Fixture::new().await;
        let other = fx.add_user("grace@example.com").await;
        let orders = OrderService::new(&fx.stores);

        let first = place(&fx, fx.user.id, 1).await;
        let second = place(&fx, fx.user.id, 2).await;
        let theirs = place(&fx, other.id, 1).await;

        let mine = orders.list_for_user(fx.user.id).await.unwrap();
        let ids: Vec<OrderId> = mine.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        assert!(orders.get_order(fx.user.id, theirs.id).await.unwrap().is_none());
        let detail = orders.get_order(other.id, theirs.id).await.unwrap().unwrap();
        assert_eq!(detail.order, theirs);
        assert_eq!(detail.items.len(), 1);
    }

    #[tokio::test]
    async fn test_order_prices_are_frozen() {
        let fx = Fixture::new().await;
        let orders = OrderService::new(&fx.stores);

        let order = place(&fx, fx.user.id, 2).await;
        fx.memory
            .set_product_price(fx.mug.id, cartwright_core::Price::from_cents(9900))
            .unwrap();

        let detail = orders.get_order(fx.user.id, order.id).await.unwrap().unwrap();
        assert_eq!(detail.order.total_amount, cartwright_core::Price::from_cents(1500));
        assert!(
            detail
                .items
                .iter()
                .all(|i| i.price == cartwright_core::Price::from_cents(750))
        );
    }
}
