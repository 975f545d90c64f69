//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{MemoryStore, Stores};
use crate::services::auth::{AuthService, Authenticator};
use crate::services::{
    CartService, CatalogService, CheckoutService, OrderService, ProfileService,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands out the services
/// built over one set of stores.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: Option<PgPool>,
    auth: Arc<dyn Authenticator>,
    profiles: ProfileService,
    carts: CartService,
    checkout: CheckoutService,
    catalog: CatalogService,
    orders: OrderService,
}

impl AppState {
    /// Create application state from stores and an authenticator.
    ///
    /// `pool` is only used by the readiness probe; pass `None` when the
    /// stores are not database-backed.
    #[must_use]
    pub fn new(stores: &Stores, auth: Arc<dyn Authenticator>, pool: Option<PgPool>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                auth,
                profiles: ProfileService::new(stores),
                carts: CartService::new(stores),
                checkout: CheckoutService::new(stores),
                catalog: CatalogService::new(stores),
                orders: OrderService::new(stores),
            }),
        }
    }

    /// State backed by `PostgreSQL` with Argon2 password authentication.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        let stores = Stores::postgres(&pool);
        let auth = Arc::new(AuthService::new(Arc::clone(&stores.users)));
        Self::new(&stores, auth, Some(pool))
    }

    /// State backed by an in-memory store with Argon2 password authentication.
    #[must_use]
    pub fn in_memory(store: &Arc<MemoryStore>) -> Self {
        let stores = Stores::memory(store);
        let auth = Arc::new(AuthService::new(Arc::clone(&stores.users)));
        Self::new(&stores, auth, None)
    }

    /// The database pool, when the stores are database-backed.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    #[must_use]
    pub fn auth(&self) -> &dyn Authenticator {
        self.inner.auth.as_ref()
    }

    #[must_use]
    pub fn profiles(&self) -> &ProfileService {
        &self.inner.profiles
    }

    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }
}
