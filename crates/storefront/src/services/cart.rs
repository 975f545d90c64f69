//! Cart service.
//!
//! Every user has at most one cart, created on first use. Lines are keyed by
//! (cart, product); adding a product that is already in the cart adds to its
//! quantity.

use std::sync::Arc;

use tracing::{debug, instrument};

use cartwright_core::{ProductId, Quantity, UserId};

use super::ShopError;
use crate::db::{CartStore, CatalogStore, RepositoryError, Stores};
use crate::models::{Cart, CartItem, CartView};

/// Cart operations for a single user at a time.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl CartService {
    /// Create a cart service over the given stores.
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            carts: Arc::clone(&stores.carts),
            catalog: Arc::clone(&stores.catalog),
        }
    }

    /// The user's cart, if they have one. Never creates.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::StoreUnavailable` if the store fails.
    pub async fn get_cart(&self, user_id: UserId) -> Result<Option<Cart>, ShopError> {
        Ok(self.carts.cart_for_user(user_id).await?)
    }

    /// Create an empty cart for the user.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Conflict` if the user already has a cart.
    pub async fn create_cart(&self, user_id: UserId) -> Result<Cart, ShopError> {
        Ok(self.carts.create_cart(user_id).await?)
    }

    /// The user's cart, creating it if absent.
    ///
    /// A concurrent first creation by another request surfaces as a conflict
    /// from the store; the winner's cart is then read back once.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Conflict` if the cart can be neither created nor
    /// read back, or `ShopError::StoreUnavailable` if the store fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_or_create_cart(&self, user_id: UserId) -> Result<Cart, ShopError> {
        if let Some(cart) = self.carts.cart_for_user(user_id).await? {
            return Ok(cart);
        }

        match self.carts.create_cart(user_id).await {
            Ok(cart) => {
                debug!(cart_id = %cart.id, "Created cart");
                Ok(cart)
            }
            Err(RepositoryError::Conflict(msg)) => {
                debug!("Lost cart creation race, re-reading");
                self.carts
                    .cart_for_user(user_id)
                    .await?
                    .ok_or(ShopError::Conflict(msg))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Add `quantity` units of a product to the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::InvalidInput` for a non-positive quantity and
    /// `ShopError::NotFound` for an unknown product.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartItem, ShopError> {
        let quantity = Quantity::try_from(quantity)?;

        if self.catalog.product(product_id).await?.is_none() {
            return Err(ShopError::NotFound("product"));
        }

        let cart = self.get_or_create_cart(user_id).await?;
        let item = self
            .carts
            .upsert_item(cart.id, product_id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ShopError::NotFound("product"),
                other => other.into(),
            })?;

        debug!(quantity = %item.quantity, "Cart line updated");
        Ok(item)
    }

    /// Remove a product's line from the user's cart.
    ///
    /// A missing line or a missing cart is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::StoreUnavailable` if the store fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> Result<(), ShopError> {
        let Some(cart) = self.carts.cart_for_user(user_id).await? else {
            return Ok(());
        };
        let removed = self.carts.remove_item(cart.id, product_id).await?;
        debug!(removed, "Cart line removal");
        Ok(())
    }

    /// Remove every line from the user's cart. The cart itself is kept.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::StoreUnavailable` if the store fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear(&self, user_id: UserId) -> Result<(), ShopError> {
        let Some(cart) = self.carts.cart_for_user(user_id).await? else {
            return Ok(());
        };
        let removed = self.carts.clear_items(cart.id).await?;
        debug!(removed, "Cart cleared");
        Ok(())
    }

    /// The user's cart with priced lines, creating the cart if absent.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::StoreUnavailable` if the store fails.
    pub async fn view_cart(&self, user_id: UserId) -> Result<CartView, ShopError> {
        let cart = self.get_or_create_cart(user_id).await?;
        let lines = self.carts.lines(cart.id).await?;
        Ok(CartView::new(cart, lines))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use cartwright_core::CartId;
    use chrono::Utc;

    use super::*;
    use crate::models::CartLine;
    use crate::test_support::Fixture;

    #[tokio::test]
    async fn test_get_or_create_is_stable() {
        let fx = Fixture::new().await;
        let carts = CartService::new(&fx.stores);

        assert!(carts.get_cart(fx.user.id).await.unwrap().is_none());
        let created = carts.get_or_create_cart(fx.user.id).await.unwrap();
        let again = carts.get_or_create_cart(fx.user.id).await.unwrap();
        let fetched = carts.get_cart(fx.user.id).await.unwrap().unwrap();

        assert_eq!(created.id, again.id);
        assert_eq!(created.id, fetched.id);
    }

    #[tokio::test]
    async fn test_create_cart_twice_conflicts() {
        let fx = Fixture::new().await;
        let carts = CartService::new(&fx.stores);

        carts.create_cart(fx.user.id).await.unwrap();
        let err = carts.create_cart(fx.user.id).await.unwrap_err();
        assert!(matches!(err, ShopError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_add_item_accumulates() {
        let fx = Fixture::new().await;
        let carts = CartService::new(&fx.stores);

        carts.add_item(fx.user.id, fx.widget.id, 2).await.unwrap();
        carts.add_item(fx.user.id, fx.widget.id, 3).await.unwrap();

        let view = carts.view_cart(fx.user.id).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity.get(), 5);
        assert_eq!(view.item_count, 5);
    }

    #[tokio::test]
    async fn test_add_item_rejects_bad_quantity() {
        let fx = Fixture::new().await;
        let carts = CartService::new(&fx.stores);

        for quantity in [0, -1] {
            let err = carts
                .add_item(fx.user.id, fx.widget.id, quantity)
                .await
                .unwrap_err();
            assert!(matches!(err, ShopError::InvalidInput(_)));
        }
        assert!(carts.get_cart(fx.user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let fx = Fixture::new().await;
        let carts = CartService::new(&fx.stores);

        let err = carts
            .add_item(fx.user.id, ProductId::new(9999), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::NotFound("product")));
    }

    #[tokio::test]
    async fn test_remove_missing_line_is_noop() {
        let fx = Fixture::new().await;
        let carts = CartService::new(&fx.stores);

        // No cart at all.
        carts.remove_item(fx.user.id, fx.widget.id).await.unwrap();

        carts.add_item(fx.user.id, fx.gadget.id, 1).await.unwrap();
        carts.remove_item(fx.user.id, fx.widget.id).await.unwrap();

        let view = carts.view_cart(fx.user.id).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].product_id, fx.gadget.id);
    }

    #[tokio::test]
    async fn test_clear_keeps_cart() {
        let fx = Fixture::new().await;
        let carts = CartService::new(&fx.stores);

        carts.clear(fx.user.id).await.unwrap();

        carts.add_item(fx.user.id, fx.widget.id, 2).await.unwrap();
        carts.add_item(fx.user.id, fx.gadget.id, 1).await.unwrap();
        let cart = carts.get_cart(fx.user.id).await.unwrap().unwrap();

        carts.clear(fx.user.id).await.unwrap();

        let view = carts.view_cart(fx.user.id).await.unwrap();
        assert_eq!(view.cart.id, cart.id);
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal, cartwright_core::Price::ZERO);
    }

    #[tokio::test]
    async fn test_add_item_past_max_quantity() {
        let fx = Fixture::new().await;
        let carts = CartService::new(&fx.stores);

        carts
            .add_item(fx.user.id, fx.widget.id, i64::from(i32::MAX))
            .await
            .unwrap();
        let err = carts.add_item(fx.user.id, fx.widget.id, 1).await.unwrap_err();
        assert!(matches!(err, ShopError::InvalidInput(_)));

        let view = carts.view_cart(fx.user.id).await.unwrap();
        assert_eq!(view.items[0].quantity.get(), i32::MAX);
    }

    /// A cart store where another request always wins the first creation.
    ///
    /// The first lookup sees no cart, `create_cart` conflicts, and every later
    /// lookup returns `winner`.
    struct RacingCarts {
        winner: Option<Cart>,
        lookups: AtomicUsize,
    }

    impl RacingCarts {
        fn new(winner: Option<Cart>) -> Self {
            Self {
                winner,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CartStore for RacingCarts {
        async fn cart_for_user(&self, _user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
            if self.lookups.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(None);
            }
            Ok(self.winner.clone())
        }

        async fn cart_by_id(&self, _cart_id: CartId) -> Result<Option<Cart>, RepositoryError> {
            Ok(self.winner.clone())
        }

        async fn create_cart(&self, _user_id: UserId) -> Result<Cart, RepositoryError> {
            Err(RepositoryError::Conflict("user already has a cart".to_owned()))
        }

        async fn upsert_item(
            &self,
            _cart_id: CartId,
            _product_id: ProductId,
            _quantity: Quantity,
        ) -> Result<CartItem, RepositoryError> {
            Err(RepositoryError::NotFound)
        }

        async fn remove_item(
            &self,
            _cart_id: CartId,
            _product_id: ProductId,
        ) -> Result<bool, RepositoryError> {
            Ok(false)
        }

        async fn clear_items(&self, _cart_id: CartId) -> Result<u64, RepositoryError> {
            Ok(0)
        }

        async fn lines(&self, _cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    fn racing_service(fx: &Fixture, winner: Option<Cart>) -> (CartService, Arc<RacingCarts>) {
        let racing = Arc::new(RacingCarts::new(winner));
        let stores = Stores {
            carts: Arc::clone(&racing) as Arc<dyn CartStore>,
            ..fx.stores.clone()
        };
        (CartService::new(&stores), racing)
    }

    #[tokio::test]
    async fn test_lost_creation_race_returns_winner() {
        let fx = Fixture::new().await;
        let winner = Cart {
            id: CartId::new(77),
            user_id: fx.user.id,
            created_at: Utc::now(),
        };
        let (carts, racing) = racing_service(&fx, Some(winner.clone()));

        let cart = carts.get_or_create_cart(fx.user.id).await.unwrap();

        assert_eq!(cart, winner);
        assert_eq!(racing.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lost_creation_race_without_winner_conflicts() {
        let fx = Fixture::new().await;
        let (carts, racing) = racing_service(&fx, None);

        let err = carts.get_or_create_cart(fx.user.id).await.unwrap_err();

        assert!(matches!(err, ShopError::Conflict(msg) if msg == "user already has a cart"));
        assert_eq!(racing.lookups.load(Ordering::SeqCst), 2);
    }
}
