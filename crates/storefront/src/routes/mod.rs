//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! # Users
//! POST   /api/users/register          - Create account (201 {user_id})
//! POST   /api/users/login             - Start session
//! POST   /api/users/logout            - End session (204)
//! GET    /api/users/me                - Current user (auth)
//! PATCH  /api/users/me                - Edit name, phone, address (auth)
//!
//! # Catalog
//! GET    /api/products[?category=]    - All products, or one category
//! GET    /api/products/{id}           - Product detail
//!
//! # Cart (auth)
//! GET    /api/cart                    - Cart with priced lines
//! POST   /api/cart                    - Add {product_id, quantity}
//! DELETE /api/cart                    - Remove {product_id} (204)
//! DELETE /api/cart/clear              - Remove every line (204)
//! POST   /api/cart/{cart_id}/checkout - Place order (201)
//!
//! # Orders (auth)
//! GET    /api/orders                  - Order history, newest first
//! GET    /api/orders/{id}             - Order with items
//! ```
//!
//! Every error body is `{"error": "<message>"}`, including malformed JSON
//! bodies and path parameters.

pub mod cart;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route("/me", get(users::me).patch(users::update_me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::remove))
        .route("/clear", delete(cart::clear))
        .route("/{cart_id}/checkout", post(cart::checkout))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/users", user_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
}
