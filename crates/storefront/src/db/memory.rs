//! In-memory store implementing every storage port.
//!
//! Used by tests and local demos. All state sits behind one mutex, so each
//! trait call is atomic with respect to every other call. Foreign keys and
//! unique constraints are enforced the same way the `PostgreSQL` schema
//! enforces them.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use cartwright_core::{
    CartId, CartItemId, Email, OrderId, OrderItemId, OrderStatus, Price, ProductId, Quantity,
    UserId,
};

use super::{CartStore, CatalogStore, OrderStore, PlaceOrder, RepositoryError, UserStore};
use crate::models::{
    Cart, CartItem, CartLine, NewOrder, NewProduct, NewUser, Order, OrderDetail, OrderItem,
    Product, User, UserProfile,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, (User, String)>,
    products: BTreeMap<ProductId, Product>,
    carts: BTreeMap<CartId, Cart>,
    cart_items: Vec<CartItem>,
    orders: BTreeMap<OrderId, Order>,
    order_items: Vec<OrderItem>,
    last_id: i32,
}

impl Tables {
    /// Next value of the shared id sequence.
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

/// Thread-safe in-memory implementation of the storage ports.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Change a product's current price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub fn set_product_price(&self, id: ProductId, price: Price) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock();
        let product = tables
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        product.price = price;
        Ok(())
    }

    /// Number of orders stored, across all users.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.tables.lock().orders.len()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables.lock().products.get(&id).cloned())
    }

    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self
            .tables
            .lock()
            .products
            .values()
            .filter(|p| p.category == category)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn all_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self.tables.lock().products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.lock();
        let stored = Product {
            id: ProductId::new(tables.next_id()),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: product.price,
            stock_quantity: product.stock_quantity,
            created_at: Utc::now(),
        };
        tables.products.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn cart_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self
            .tables
            .lock()
            .carts
            .values()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn cart_by_id(&self, cart_id: CartId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.tables.lock().carts.get(&cart_id).cloned())
    }

    async fn create_cart(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&user_id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.carts.values().any(|c| c.user_id == user_id) {
            return Err(RepositoryError::Conflict("user already has a cart".to_owned()));
        }
        let cart = Cart {
            id: CartId::new(tables.next_id()),
            user_id,
            created_at: Utc::now(),
        };
        tables.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn upsert_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartItem, RepositoryError> {
        let mut tables = self.tables.lock();
        if !tables.carts.contains_key(&cart_id) || !tables.products.contains_key(&product_id) {
            return Err(RepositoryError::NotFound);
        }

        if let Some(item) = tables
            .cart_items
            .iter_mut()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            let total = i64::from(item.quantity.get()) + i64::from(quantity.get());
            item.quantity = Quantity::try_from(total)
                .map_err(|e| RepositoryError::OutOfRange(e.to_string()))?;
            return Ok(item.clone());
        }

        let item = CartItem {
            id: CartItemId::new(tables.next_id()),
            cart_id,
            product_id,
            quantity,
            added_at: Utc::now(),
        };
        tables.cart_items.push(item.clone());
        Ok(item)
    }

    async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock();
        let before = tables.cart_items.len();
        tables
            .cart_items
            .retain(|i| !(i.cart_id == cart_id && i.product_id == product_id));
        Ok(tables.cart_items.len() < before)
    }

    async fn clear_items(&self, cart_id: CartId) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.lock();
        let before = tables.cart_items.len();
        tables.cart_items.retain(|i| i.cart_id != cart_id);
        Ok(u64::try_from(before - tables.cart_items.len()).unwrap_or(u64::MAX))
    }

    async fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let tables = self.tables.lock();
        tables
            .cart_items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .map(|i| {
                let product = tables.products.get(&i.product_id).ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "cart line references missing product {}",
                        i.product_id
                    ))
                })?;
                Ok(CartLine::new(
                    i.product_id,
                    product.name.clone(),
                    i.quantity,
                    product.price,
                ))
            })
            .collect()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn place_order(&self, order: &NewOrder) -> Result<PlaceOrder, RepositoryError> {
        let mut tables = self.tables.lock();

        let mut consumed: Vec<(ProductId, Quantity)> = tables
            .cart_items
            .iter()
            .filter(|i| i.cart_id == order.cart_id)
            .map(|i| (i.product_id, i.quantity))
            .collect();
        if consumed.is_empty() {
            return Ok(PlaceOrder::CartEmptied);
        }
        if !order.matches_lines(&mut consumed) {
            return Ok(PlaceOrder::CartChanged);
        }

        let placed = Order {
            id: OrderId::new(tables.next_id()),
            user_id: order.user_id,
            status: OrderStatus::Pending,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address.clone(),
            billing_address: order.billing_address.clone(),
            created_at: Utc::now(),
        };
        for line in &order.lines {
            let item = OrderItem {
                id: OrderItemId::new(tables.next_id()),
                order_id: placed.id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price,
            };
            tables.order_items.push(item);
        }
        tables.orders.insert(placed.id, placed.clone());
        tables.cart_items.retain(|i| i.cart_id != order.cart_id);

        Ok(PlaceOrder::Placed(placed))
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self
            .tables
            .lock()
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn order_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let tables = self.tables.lock();
        let Some(order) = tables
            .orders
            .get(&order_id)
            .filter(|o| o.user_id == user_id)
        else {
            return Ok(None);
        };

        let items = tables
            .order_items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect();

        Ok(Some(OrderDetail {
            order: order.clone(),
            items,
        }))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.lock().users.get(&id).map(|(u, _)| u.clone()))
    }

    async fn credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .find(|(u, _)| &u.email == email)
            .cloned())
    }

    async fn create_user(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock();
        if tables.users.values().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let created = User {
            id: UserId::new(tables.next_id()),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            created_at: Utc::now(),
        };
        tables
            .users
            .insert(created.id, (created.clone(), password_hash.to_owned()));
        Ok(created)
    }

    async fn update_profile(
        &self,
        id: UserId,
        profile: &UserProfile,
    ) -> Result<Option<User>, RepositoryError> {
        let mut tables = self.tables.lock();
        let Some((user, _)) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        user.first_name.clone_from(&profile.first_name);
        user.last_name.clone_from(&profile.last_name);
        user.phone.clone_from(&profile.phone);
        user.address.clone_from(&profile.address);
        Ok(Some(user.clone()))
    }
}
