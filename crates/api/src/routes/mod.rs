//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Health
//! GET    /health                               - Dependency report
//! GET    /health/live                          - Liveness
//! GET    /health/ready                         - Readiness (database)
//!
//! # Auth (rate limited)
//! POST   /api/auth/register                    - Create a customer account
//! POST   /api/auth/login                       - Exchange credentials for a token
//! GET    /api/auth/me                          - Caller's profile (auth)
//!
//! # Products
//! GET    /api/products                         - Search, filter, paginate
//! GET    /api/products/{id}                    - Product detail
//! POST   /api/products                         - Create (admin)
//! PUT    /api/products/{id}                    - Replace (admin)
//! DELETE /api/products/{id}                    - Delete (admin)
//! POST   /api/products/{id}/images             - Add image (admin)
//! DELETE /api/products/{id}/images/{imageId}   - Remove image (admin)
//!
//! # Categories
//! GET    /api/categories                       - List with product counts
//! GET    /api/categories/{id}                  - Category detail
//! POST   /api/categories                       - Create (admin)
//! PUT    /api/categories/{id}                  - Rename (admin)
//! DELETE /api/categories/{id}                  - Delete unused category (admin)
//!
//! # Admin dashboard
//! GET    /api/admindashboard                   - Statistics (admin)
//! GET    /api/admindashboard/users             - User list (admin)
//! PUT    /api/admindashboard/users/{id}/role   - Change role (admin)
//! ```

pub mod admin_dashboard;
pub mod auth;
pub mod categories;
pub mod health;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the health routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
}

/// Create the auth routes router, optionally rate limited.
pub fn auth_routes(rate_limited: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    if !rate_limited {
        return router;
    }

    match auth_rate_limiter() {
        Some(limiter) => router.layer(limiter),
        None => {
            tracing::warn!("Auth rate limiter could not be built; serving without it");
            router
        }
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::index).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/api/products/{id}/images", post(products::add_image))
        .route(
            "/api/products/{id}/images/{image_id}",
            delete(products::remove_image),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/categories",
            get(categories::index).post(categories::create),
        )
        .route(
            "/api/categories/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
}

/// Create the admin dashboard routes router.
pub fn admin_dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admindashboard", get(admin_dashboard::summary))
        .route("/api/admindashboard/users", get(admin_dashboard::users))
        .route(
            "/api/admindashboard/users/{id}/role",
            put(admin_dashboard::change_role),
        )
}

/// All application routes.
pub fn routes(rate_limited: bool) -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api/auth", auth_routes(rate_limited))
        .merge(product_routes())
        .merge(category_routes())
        .merge(admin_dashboard_routes())
}
