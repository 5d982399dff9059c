//! Integration tests for the admin dashboard.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (sh-cli migrate)
//! - An admin account (see the crate docs)
//! - The API running with `RATE_LIMIT_ENABLED=false`

use reqwest::StatusCode;
use serde_json::{Value, json};

use storehouse_integration_tests::{
    STRONG_PASSWORD, admin_token, client, register_customer, unique_email, url,
};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_summary_counts_are_consistent() {
    let client = client();
    let token = admin_token(&client).await;

    let response = client
        .get(url("/api/admindashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("dashboard");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("dashboard body");

    let users = body["totalUsers"].as_i64().expect("totalUsers");
    let admins = body["totalAdmins"].as_i64().expect("totalAdmins");
    assert!(admins >= 1);
    assert!(admins <= users);
    assert!(body["recentProducts"].as_array().expect("recent products").len() <= 5);
    assert!(body["recentUsers"].as_array().expect("recent users").len() <= 5);
    assert!(body["productsPerCategory"].is_array());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_user_search_and_role_change() {
    let client = client();
    let admin = admin_token(&client).await;
    let email = unique_email("promote");

    let response = client
        .post(url("/api/auth/register"))
        .json(&json!({ "email": email, "password": STRONG_PASSWORD }))
        .send()
        .await
        .expect("register");
    let registered: Value = response.json().await.expect("register body");
    let user_id = registered["user"]["id"].as_i64().expect("user id");

    let response = client
        .get(url(&format!("/api/admindashboard/users?search={email}&pageSize=5")))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("search users");
    assert_eq!(response.status(), StatusCode::OK);
    let page: Value = response.json().await.expect("users page");
    assert_eq!(page["totalCount"], 1);
    assert_eq!(page["pageSize"], 5);

    let response = client
        .put(url(&format!("/api/admindashboard/users/{user_id}/role")))
        .bearer_auth(&admin)
        .json(&json!({ "role": "Admin" }))
        .send()
        .await
        .expect("promote");
    assert_eq!(response.status(), StatusCode::OK);
    let promoted: Value = response.json().await.expect("promoted body");
    assert_eq!(promoted["role"], "Admin");

    // Tokens carry the role at issue time; a fresh login picks up the change
    let response = client
        .post(url("/api/auth/login"))
        .json(&json!({ "email": email, "password": STRONG_PASSWORD }))
        .send()
        .await
        .expect("login");
    let login: Value = response.json().await.expect("login body");
    assert_eq!(login["user"]["role"], "Admin");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_role_change_for_unknown_user_is_404() {
    let client = client();
    let admin = admin_token(&client).await;

    let response = client
        .put(url("/api/admindashboard/users/2147483000/role"))
        .bearer_auth(&admin)
        .json(&json!({ "role": "Customer" }))
        .send()
        .await
        .expect("change role");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_customer_cannot_list_users() {
    let client = client();
    let token = register_customer(&client).await;

    let response = client
        .get(url("/api/admindashboard/users"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("list users");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
