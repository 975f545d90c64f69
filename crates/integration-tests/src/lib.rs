//! Integration tests for Cartwright.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests (no services needed)
//! cargo test -p cartwright-integration-tests
//!
//! # Including tests against PostgreSQL and a running server
//! cargo run -p cartwright-cli -- migrate
//! cargo test -p cartwright-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `checkout` - Cart and checkout properties over the in-memory store
//! - `api` - Full router driven with `tower::ServiceExt::oneshot`
//! - `postgres` - Store adapters against a migrated database (ignored by default)
//! - `live_server` - HTTP smoke test against a running storefront (ignored by default)
//!
//! This crate provides [`TestApp`], an in-process storefront backed by
//! [`MemoryStore`] and in-memory sessions.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use cartwright_core::Price;
use cartwright_storefront::db::{CatalogStore, MemoryStore};
use cartwright_storefront::middleware::session_layer_with_store;
use cartwright_storefront::models::{NewProduct, Product};
use cartwright_storefront::state::AppState;

/// Password used for every account created by [`TestApp::login_as`].
pub const TEST_PASSWORD: &str = "analytical engine";

/// A response reduced to what tests assert on.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// `name=value` of the session cookie, when the response set one.
    pub cookie: Option<String>,
}

/// An in-process storefront over an in-memory store.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    router: Router,
}

impl TestApp {
    /// Build the full router over a fresh store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::in_memory(&store);
        let sessions = session_layer_with_store(tower_sessions::MemoryStore::default(), false);
        let router = cartwright_storefront::app(state, sessions);
        Self { store, router }
    }

    /// Insert a product directly into the store.
    pub async fn add_product(&self, name: &str, category: &str, cents: i64) -> Product {
        self.store
            .insert_product(&NewProduct {
                name: name.to_owned(),
                description: None,
                category: category.to_owned(),
                price: Price::from_cents(cents),
                stock_quantity: 100,
            })
            .await
            .unwrap()
    }

    /// Send one request through the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_owned);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            body,
            cookie,
        }
    }

    /// Register `email` with an address and log in; returns the session cookie.
    pub async fn login_as(&self, email: &str) -> String {
        let registered = self
            .request(
                Method::POST,
                "/api/users/register",
                Some(serde_json::json!({
                    "email": email,
                    "password": TEST_PASSWORD,
                    "first_name": "Test",
                    "address": "1 Main St",
                    "city": "Springfield",
                    "state": "IL",
                    "zip_code": "62701",
                })),
                None,
            )
            .await;
        assert_eq!(registered.status, StatusCode::CREATED, "{:?}", registered.body);

        let login = self
            .request(
                Method::POST,
                "/api/users/login",
                Some(serde_json::json!({ "email": email, "password": TEST_PASSWORD })),
                None,
            )
            .await;
        assert_eq!(login.status, StatusCode::OK, "{:?}", login.body);
        login.cookie.expect("login sets a session cookie")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
