//! Cart and checkout route handlers.
//!
//! All handlers act on the logged-in user's own cart. Checkout takes the
//! cart id in the path and refuses carts owned by someone else.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use cartwright_core::{CartId, ProductId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{CartItem, CartView, Order};
use crate::state::AppState;

/// Body of `POST /api/cart`.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    /// Validated by the cart service, so zero and negatives reach it as-is.
    pub quantity: i64,
}

/// Body of `DELETE /api/cart`.
#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub product_id: ProductId,
}

/// The current user's cart with priced lines.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    Ok(Json(state.carts().view_cart(user.id).await?))
}

/// Add a product to the cart.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<CartItem>> {
    let Json(body) = body?;
    let item = state
        .carts()
        .add_item(user.id, body.product_id, body.quantity)
        .await?;
    Ok(Json(item))
}

/// Remove a product's line from the cart.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<RemoveItemRequest>, JsonRejection>,
) -> Result<StatusCode> {
    let Json(body) = body?;
    state.carts().remove_item(user.id, body.product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove every line from the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<StatusCode> {
    state.carts().clear(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check out the cart, placing an order.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    cart_id: std::result::Result<Path<CartId>, PathRejection>,
) -> Result<(StatusCode, Json<Order>)> {
    let Path(cart_id) = cart_id?;
    let order = state.checkout().checkout(cart_id, user.id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}
