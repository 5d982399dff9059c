//! Integration tests for products and categories.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (sh-cli migrate)
//! - An admin account (see the crate docs)
//! - The API running with `RATE_LIMIT_ENABLED=false`

use reqwest::StatusCode;
use serde_json::{Value, json};

use storehouse_integration_tests::{
    admin_token, client, create_category, create_product, delete_category, delete_product,
    unique_name, url,
};

// ============================================================================
// Listing & pagination
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_page_size_and_number_are_clamped() {
    let client = client();

    let response = client
        .get(url("/api/products?pageNumber=0&pageSize=500"))
        .send()
        .await
        .expect("list products");
    assert_eq!(response.status(), StatusCode::OK);

    let page: Value = response.json().await.expect("page body");
    assert_eq!(page["pageNumber"], 1);
    assert_eq!(page["pageSize"], 50);
    assert_eq!(page["hasPreviousPage"], false);
    assert!(page["items"].as_array().expect("items").len() <= 50);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_page_past_the_end_is_empty_with_totals() {
    let client = client();
    let token = admin_token(&client).await;
    let category = create_category(&client, &token, &unique_name("Paging")).await;
    let product = create_product(
        &client,
        &token,
        &json!({ "name": "Paging marker", "price": 1.5, "categoryIds": [category] }),
    )
    .await;

    let response = client
        .get(url(&format!("/api/products?categories={category}&pageNumber=9")))
        .send()
        .await
        .expect("list products");
    assert_eq!(response.status(), StatusCode::OK);
    let page: Value = response.json().await.expect("page body");

    assert_eq!(page["items"].as_array().expect("items").len(), 0);
    assert_eq!(page["totalCount"], 1);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["hasNextPage"], false);

    delete_product(&client, &token, product["id"].as_i64().expect("id")).await;
    delete_category(&client, &token, category).await;
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_search_and_price_filters() {
    let client = client();
    let token = admin_token(&client).await;
    let marker = format!("lantern-{}", uuid::Uuid::new_v4().simple());
    let category = create_category(&client, &token, &unique_name("Filters")).await;

    let cheap = create_product(
        &client,
        &token,
        &json!({ "name": format!("{marker} small"), "price": 5, "categoryIds": [category] }),
    )
    .await;
    let dear = create_product(
        &client,
        &token,
        &json!({ "name": format!("{marker} large"), "price": 50, "categoryIds": [category] }),
    )
    .await;

    let response = client
        .get(url(&format!("/api/products?search={marker}&minPrice=10")))
        .send()
        .await
        .expect("filtered list");
    let page: Value = response.json().await.expect("page body");
    let items = page["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().expect("item")["id"], dear["id"]);

    // Inverted range matches nothing
    let response = client
        .get(url(&format!(
            "/api/products?search={marker}&minPrice=60&maxPrice=1"
        )))
        .send()
        .await
        .expect("inverted range");
    let page: Value = response.json().await.expect("page body");
    assert_eq!(page["totalCount"], 0);

    delete_product(&client, &token, cheap["id"].as_i64().expect("id")).await;
    delete_product(&client, &token, dear["id"].as_i64().expect("id")).await;
    delete_category(&client, &token, category).await;
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_price_bounds_are_inclusive() {
    let client = client();
    let token = admin_token(&client).await;
    let category = create_category(&client, &token, &unique_name("Bounds")).await;

    let mut products = Vec::new();
    for price in [5, 10, 20, 25] {
        let product = create_product(
            &client,
            &token,
            &json!({ "name": format!("Bound {price}"), "price": price, "categoryIds": [category] }),
        )
        .await;
        products.push(product["id"].as_i64().expect("id"));
    }
    let [_, ten, twenty, _] = <[i64; 4]>::try_from(products.clone()).expect("four products");

    let page = list(
        &client,
        &format!("categories={category}&minPrice=10&maxPrice=20"),
    )
    .await;
    assert_eq!(page["totalCount"], 2);
    assert_eq!(ids_of(&page), vec![ten, twenty]);

    for id in products {
        delete_product(&client, &token, id).await;
    }
    delete_category(&client, &token, category).await;
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_category_filter_matches_any_listed_category() {
    let client = client();
    let token = admin_token(&client).await;
    let first = create_category(&client, &token, &unique_name("Any A")).await;
    let second = create_category(&client, &token, &unique_name("Any B")).await;
    let other = create_category(&client, &token, &unique_name("Any C")).await;

    let mut products = Vec::new();
    for category_ids in [json!([first]), json!([second]), json!([other]), json!([first, second])] {
        let product = create_product(
            &client,
            &token,
            &json!({ "name": "Any match", "price": 2, "categoryIds": category_ids }),
        )
        .await;
        products.push(product["id"].as_i64().expect("id"));
    }
    let [in_first, in_second, _, in_both] =
        <[i64; 4]>::try_from(products.clone()).expect("four products");

    let page = list(&client, &format!("categories={first},{second}")).await;
    assert_eq!(page["totalCount"], 3);
    assert_eq!(ids_of(&page), vec![in_first, in_second, in_both]);

    for id in products {
        delete_product(&client, &token, id).await;
    }
    for category in [first, second, other] {
        delete_category(&client, &token, category).await;
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_search_matches_description() {
    let client = client();
    let token = admin_token(&client).await;
    let marker = format!("enamel-{}", uuid::Uuid::new_v4().simple());

    let product = create_product(
        &client,
        &token,
        &json!({
            "name": "Desk lamp",
            "description": format!("Pairs with the {marker} mug"),
            "price": 30,
        }),
    )
    .await;
    let id = product["id"].as_i64().expect("id");

    let page = list(&client, &format!("search={}", marker.to_uppercase())).await;
    assert_eq!(page["totalCount"], 1);
    assert_eq!(ids_of(&page), vec![id]);

    delete_product(&client, &token, id).await;
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_search_wildcards_match_literally() {
    let client = client();
    let token = admin_token(&client).await;
    let marker = format!("promo-{}", uuid::Uuid::new_v4().simple());

    let mut ids = Vec::new();
    for suffix in ["50% off", "500 pack", "a_b", "axb"] {
        let product = create_product(
            &client,
            &token,
            &json!({ "name": format!("{marker} {suffix}"), "price": 4 }),
        )
        .await;
        ids.push(product["id"].as_i64().expect("id"));
    }
    let [percent, _, underscore, _] = <[i64; 4]>::try_from(ids.clone()).expect("four products");

    // "%" is sent as %25 and the space as %20
    let page = list(&client, &format!("search={marker}%2050%25")).await;
    assert_eq!(page["totalCount"], 1);
    assert_eq!(ids_of(&page), vec![percent]);

    let page = list(&client, &format!("search={marker}%20a_b")).await;
    assert_eq!(page["totalCount"], 1);
    assert_eq!(ids_of(&page), vec![underscore]);

    for id in ids {
        delete_product(&client, &token, id).await;
    }
}

// ============================================================================
// Product writes
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_unknown_category_id_rejected() {
    let client = client();
    let token = admin_token(&client).await;

    let response = client
        .post(url("/api/products"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Orphan", "price": 3, "categoryIds": [2_147_483_000] }))
        .send()
        .await
        .expect("create product");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem: Value = response.json().await.expect("problem body");
    assert!(problem["errors"]["categoryIds"].is_array());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_lifecycle_with_images() {
    let client = client();
    let token = admin_token(&client).await;
    let first = create_category(&client, &token, &unique_name("Lifecycle A")).await;
    let second = create_category(&client, &token, &unique_name("Lifecycle B")).await;

    let product = create_product(
        &client,
        &token,
        &json!({
            "name": "Lifecycle mug",
            "description": "Enamel",
            "price": 12.5,
            "categoryIds": [first, first],
            "imageUrls": ["/images/mug.jpg"],
        }),
    )
    .await;
    let id = product["id"].as_i64().expect("id");
    assert_eq!(product["categoryIds"], json!([first]));
    assert_eq!(product["images"].as_array().expect("images").len(), 1);

    // Replace the category set
    let response = client
        .put(url(&format!("/api/products/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "name": "Lifecycle mug", "price": 14, "categoryIds": [second] }))
        .send()
        .await
        .expect("update product");
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.expect("updated body");
    assert_eq!(updated["categoryIds"], json!([second]));
    assert_eq!(updated["price"], 14.0);

    let response = client
        .post(url(&format!("/api/products/{id}/images")))
        .bearer_auth(&token)
        .json(&json!({ "url": "https://cdn.example.com/mug-2.jpg" }))
        .send()
        .await
        .expect("add image");
    assert_eq!(response.status(), StatusCode::CREATED);
    let image: Value = response.json().await.expect("image body");
    let image_id = image["id"].as_i64().expect("image id");

    let response = client
        .delete(url(&format!("/api/products/{id}/images/{image_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .expect("remove image");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .delete(url(&format!("/api/products/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete product");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(url(&format!("/api/products/{id}")))
        .send()
        .await
        .expect("get deleted product");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    delete_category(&client, &token, first).await;
    delete_category(&client, &token, second).await;
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_update_missing_product_is_404_before_category_check() {
    let client = client();
    let token = admin_token(&client).await;

    let response = client
        .put(url("/api/products/2147483000"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Ghost", "price": 3, "categoryIds": [2_147_483_001] }))
        .send()
        .await
        .expect("update product");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_add_image_touches_product() {
    let client = client();
    let token = admin_token(&client).await;

    let response = client
        .post(url("/api/products/2147483000/images"))
        .bearer_auth(&token)
        .json(&json!({ "url": "/images/ghost.jpg" }))
        .send()
        .await
        .expect("add image to missing product");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let product = create_product(&client, &token, &json!({ "name": "Framed print", "price": 40 })).await;
    let id = product["id"].as_i64().expect("id");

    let response = client
        .post(url(&format!("/api/products/{id}/images")))
        .bearer_auth(&token)
        .json(&json!({ "url": "/images/print.jpg" }))
        .send()
        .await
        .expect("add image");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .get(url(&format!("/api/products/{id}")))
        .send()
        .await
        .expect("get product");
    let fetched: Value = response.json().await.expect("product body");
    assert_eq!(fetched["images"].as_array().expect("images").len(), 1);
    assert_ne!(fetched["updatedAt"], product["updatedAt"]);

    delete_product(&client, &token, id).await;
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_category_in_use_cannot_be_deleted() {
    let client = client();
    let token = admin_token(&client).await;
    let category = create_category(&client, &token, &unique_name("In use")).await;
    let product = create_product(
        &client,
        &token,
        &json!({ "name": "Anchor", "price": 1, "categoryIds": [category] }),
    )
    .await;

    let response = client
        .delete(url(&format!("/api/categories/{category}")))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete category");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(url(&format!("/api/categories/{category}")))
        .send()
        .await
        .expect("get category");
    let body: Value = response.json().await.expect("category body");
    assert_eq!(body["productCount"], 1);

    delete_product(&client, &token, product["id"].as_i64().expect("id")).await;

    let response = client
        .delete(url(&format!("/api/categories/{category}")))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete category again");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_category_name_rejected() {
    let client = client();
    let token = admin_token(&client).await;
    let name = unique_name("Dup");
    let category = create_category(&client, &token, &name).await;

    let response = client
        .post(url("/api/categories"))
        .bearer_auth(&token)
        .json(&json!({ "name": name.to_uppercase() }))
        .send()
        .await
        .expect("create duplicate");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem: Value = response.json().await.expect("problem body");
    assert!(problem["errors"]["name"].is_array());

    delete_category(&client, &token, category).await;
}

async fn list(client: &reqwest::Client, query: &str) -> Value {
    let response = client
        .get(url(&format!("/api/products?{query}")))
        .send()
        .await
        .expect("list products");
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("page body")
}

fn ids_of(page: &Value) -> Vec<i64> {
    page["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}
