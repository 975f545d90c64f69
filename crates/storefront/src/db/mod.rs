//! Database operations for the storefront.
//!
//! # Database: `cartwright`
//!
//! All tables live in the `storefront` schema:
//!
//! - `user` / `user_password` - Shoppers and their Argon2 password hashes
//! - `product` - Catalog
//! - `cart` / `cart_item` - One cart per user, one line per (cart, product)
//! - `order` / `order_item` - Placed orders with point-in-time prices
//!
//! Sessions live in `tower_sessions.session` (owned by `tower-sessions-sqlx-store`).
//!
//! # Ports
//!
//! Services never touch `sqlx` directly. They hold `Arc<dyn CatalogStore>`,
//! `Arc<dyn CartStore>`, `Arc<dyn OrderStore>` and `Arc<dyn UserStore>`,
//! implemented by the `Pg*Repository` types here and by [`MemoryStore`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p cartwright-cli -- migrate
//! ```

pub mod carts;
pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use cartwright_core::{CartId, Email, OrderId, ProductId, Quantity, UserId};

use crate::models::{
    Cart, CartItem, CartLine, NewOrder, NewProduct, NewUser, Order, OrderDetail, Product, User,
    UserProfile,
};

pub use carts::PgCartRepository;
pub use memory::MemoryStore;
pub use orders::PgOrderRepository;
pub use products::PgCatalogRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A referenced entity does not exist.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, second cart for a user).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A computed value does not fit its column (e.g., a merged cart quantity).
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

/// Map constraint violations on a write to their repository meaning.
///
/// Unique violations become [`RepositoryError::Conflict`] with `what` as the
/// message; foreign-key violations become [`RepositoryError::NotFound`];
/// numeric overflow becomes [`RepositoryError::OutOfRange`].
pub(crate) fn map_constraint(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(what.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
        if db_err.code().as_deref() == Some(NUMERIC_VALUE_OUT_OF_RANGE) {
            return RepositoryError::OutOfRange(db_err.message().to_owned());
        }
    }
    RepositoryError::Database(e)
}

/// SQLSTATE raised when an `INTEGER` expression overflows.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Outcome of the checkout write phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOrder {
    /// Order and items written, cart emptied.
    Placed(Order),
    /// The cart had no items left when the write phase ran. Nothing was written.
    CartEmptied,
    /// The cart's items differ from the lines the order was priced from.
    /// Nothing was written.
    CartChanged,
}

/// Read access to the product catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Look up a product by id.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products in a category, ordered by name.
    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, RepositoryError>;

    /// Every product, ordered by name.
    async fn all_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Insert a product. Used by catalog seeding.
    async fn insert_product(&self, product: &NewProduct) -> Result<Product, RepositoryError>;
}

/// Per-user carts and their lines.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The cart owned by `user_id`, if one exists.
    async fn cart_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError>;

    /// Look up a cart by id, regardless of owner.
    async fn cart_by_id(&self, cart_id: CartId) -> Result<Option<Cart>, RepositoryError>;

    /// Create an empty cart.
    ///
    /// Fails with [`RepositoryError::Conflict`] when the user already owns one.
    async fn create_cart(&self, user_id: UserId) -> Result<Cart, RepositoryError>;

    /// Insert a line or add `quantity` to the existing (cart, product) line.
    ///
    /// Fails with [`RepositoryError::NotFound`] when the product does not exist.
    async fn upsert_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartItem, RepositoryError>;

    /// Delete the (cart, product) line. Returns whether a line was removed.
    async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError>;

    /// Delete every line of the cart. Returns the number of lines removed.
    async fn clear_items(&self, cart_id: CartId) -> Result<u64, RepositoryError>;

    /// Lines of the cart joined with current product names and prices,
    /// ordered by when they were added.
    async fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError>;
}

/// Orders and the checkout write phase.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Atomically write the order and its items and empty the cart.
    ///
    /// Either everything is written or nothing is.
    async fn place_order(&self, order: &NewOrder) -> Result<PlaceOrder, RepositoryError>;

    /// The user's orders, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// One order with its items, only if it belongs to `user_id`.
    async fn order_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<OrderDetail>, RepositoryError>;
}

/// Shopper accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a user by id.
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up a user and their password hash by email.
    async fn credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Create a user together with their password hash.
    ///
    /// Fails with [`RepositoryError::Conflict`] when the email is taken.
    async fn create_user(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;

    /// Overwrite the user's profile fields. Returns `None` for an unknown id.
    async fn update_profile(
        &self,
        id: UserId,
        profile: &UserProfile,
    ) -> Result<Option<User>, RepositoryError>;
}

/// The four store ports, bundled for wiring into services.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// Stores backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            catalog: Arc::new(PgCatalogRepository::new(pool.clone())),
            carts: Arc::new(PgCartRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
        }
    }

    /// Stores backed by a single in-memory store.
    #[must_use]
    pub fn memory(store: &Arc<MemoryStore>) -> Self {
        Self {
            catalog: store.clone(),
            carts: store.clone(),
            orders: store.clone(),
            users: store.clone(),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on open connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
