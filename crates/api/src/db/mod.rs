//! Database operations for the catalog `PostgreSQL` database.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `user` - Accounts with Argon2 password hashes and a role
//! - `category` - Product categories (name unique, case-insensitive)
//! - `product` - Catalog entries with a `NUMERIC(12,2)` price
//! - `product_category` - Many-to-many link (cascades from product, restricts category deletes)
//! - `product_image` - Image URLs, cascade deleted with their product
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p storehouse-cli -- migrate
//! ```

pub mod categories;
pub mod dashboard;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use dashboard::DashboardRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Entity is still referenced by other rows and cannot be removed.
    #[error("still in use: {0}")]
    InUse(String),
}

impl RepositoryError {
    /// Translate unique and foreign-key violations into domain errors.
    ///
    /// `conflict` describes a unique violation, `in_use` a foreign-key
    /// violation. Anything else stays a plain database error.
    pub(crate) fn from_constraint(error: sqlx::Error, conflict: &str, in_use: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = error {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::InUse(in_use.to_owned());
            }
        }
        Self::Database(error)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Escape `LIKE` wildcards so the term matches literally, then wrap it in `%`.
///
/// `PostgreSQL` uses backslash as the default `LIKE` escape character.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
