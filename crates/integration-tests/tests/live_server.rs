//! Smoke test against a running storefront.
//!
//! ```bash
//! cargo run -p cartwright-storefront &
//! STOREFRONT_BASE_URL=http://localhost:3000 \
//!     cargo test -p cartwright-integration-tests --test live_server -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

#[tokio::test]
#[ignore = "Requires a running storefront - set STOREFRONT_BASE_URL"]
async fn test_live_health() {
    let response = reqwest::get(format!("{}/health/ready", base_url()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires a running storefront - set STOREFRONT_BASE_URL"]
async fn test_live_session_flow() {
    let base = base_url();
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();
    let email = format!("live-{}@example.com", uuid::Uuid::new_v4().simple());

    let registered = client
        .post(format!("{base}/api/users/register"))
        .json(&json!({ "email": email, "password": cartwright_integration_tests::TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(registered.status(), StatusCode::CREATED);

    let anonymous = client.get(format!("{base}/api/cart")).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let login = client
        .post(format!("{base}/api/users/login"))
        .json(&json!({ "email": email, "password": cartwright_integration_tests::TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);

    let cart: Value = client
        .get(format!("{base}/api/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["items"], json!([]));
}
