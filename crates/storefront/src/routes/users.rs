//! Account route handlers: registration, login, logout, profile.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, ProfileUpdate, User};
use crate::services::auth::Registration;
use crate::state::AppState;

/// Body of `POST /api/users/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Create an account. Does not log the new user in.
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(registration) = body?;
    let user = state.auth().register(registration).await?;
    info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(json!({ "user_id": user.id }))))
}

/// Log in with email and password.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<User>> {
    let Json(body) = body?;
    let user = state.auth().authenticate(&body.email, &body.password).await?;

    set_current_user(
        &session,
        &CurrentUser {
            id: user.id,
            email: user.email.clone(),
        },
    )
    .await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    info!(user_id = %user.id, "User logged in");

    Ok(Json(user))
}

/// Log out. Succeeds whether or not anyone was logged in.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in user's profile.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<User>> {
    Ok(Json(state.profiles().get(user.id).await?))
}

/// Edit the logged-in user's name, phone or address.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: std::result::Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<User>> {
    let Json(update) = body?;
    Ok(Json(state.profiles().update(user.id, update).await?))
}
