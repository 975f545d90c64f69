//! Order history route handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use tracing::instrument;

use cartwright_core::OrderId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderDetail};
use crate::state::AppState;

/// The current user's orders, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list_for_user(user.id).await?))
}

/// One of the current user's orders with its items.
///
/// Orders belonging to other users are reported as not found.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: std::result::Result<Path<OrderId>, PathRejection>,
) -> Result<Json<OrderDetail>> {
    let Path(id) = id?;
    state
        .orders()
        .get_order(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("order".to_string()))
}
