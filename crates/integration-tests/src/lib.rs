//! Integration tests for the Storehouse catalog API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cargo run -p storehouse-cli -- migrate
//!
//! # Create the admin the tests log in as
//! cargo run -p storehouse-cli -- user create -r admin \
//!     -e it-admin@example.com -p 'Integr4tion!admin'
//!
//! # Start the API (rate limiting off, tests log in repeatedly)
//! RATE_LIMIT_ENABLED=false cargo run -p storehouse-api
//!
//! # Run the ignored tests
//! cargo test -p storehouse-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - defaults to `http://localhost:8080`
//! - `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD` - admin credentials

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Password that satisfies every rule of the password policy.
pub const STRONG_PASSWORD: &str = "Integr4tion!pass";

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned())
}

/// Absolute URL for an API path.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url().trim_end_matches('/'))
}

/// Plain HTTP client.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Email that no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Unique display name for catalog fixtures.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix} {}", uuid::Uuid::new_v4().simple())
}

/// Register a fresh customer and return its bearer token.
pub async fn register_customer(client: &Client) -> String {
    let response = client
        .post(url("/api/auth/register"))
        .json(&json!({
            "email": unique_email("customer"),
            "password": STRONG_PASSWORD,
            "firstName": "Test",
            "lastName": "Customer",
        }))
        .send()
        .await
        .expect("Failed to register customer");

    assert_eq!(response.status(), StatusCode::OK);
    token_of(response).await
}

/// Log in as the admin named by `TEST_ADMIN_EMAIL` and return its token.
pub async fn admin_token(client: &Client) -> String {
    let email =
        std::env::var("TEST_ADMIN_EMAIL").unwrap_or_else(|_| "it-admin@example.com".to_owned());
    let password =
        std::env::var("TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "Integr4tion!admin".to_owned());

    let response = client
        .post(url("/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to log in as admin");

    assert_eq!(
        response.status(),
        StatusCode::OK,
        "admin login failed; create the admin with sh-cli first"
    );
    token_of(response).await
}

/// Create a category as admin and return its id.
pub async fn create_category(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post(url("/api/categories"))
        .bearer_auth(token)
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to create category");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Invalid category body");
    body["id"].as_i64().expect("category id")
}

/// Create a product as admin and return the response body.
pub async fn create_product(client: &Client, token: &str, body: &Value) -> Value {
    let response = client
        .post(url("/api/products"))
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .expect("Failed to create product");

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Invalid product body")
}

/// Delete a product as admin, ignoring the outcome.
pub async fn delete_product(client: &Client, token: &str, id: i64) {
    let _ = client
        .delete(url(&format!("/api/products/{id}")))
        .bearer_auth(token)
        .send()
        .await;
}

/// Delete a category as admin, ignoring the outcome.
pub async fn delete_category(client: &Client, token: &str, id: i64) {
    let _ = client
        .delete(url(&format!("/api/categories/{id}")))
        .bearer_auth(token)
        .send()
        .await;
}

async fn token_of(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("Invalid auth body");
    body["token"].as_str().expect("token").to_owned()
}
