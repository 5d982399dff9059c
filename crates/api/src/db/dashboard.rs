//! Aggregate queries for the admin dashboard.

use rust_decimal::Decimal;
use sqlx::PgPool;

use storehouse_core::Role;

use super::RepositoryError;
use crate::models::{DashboardTotals, PriceStats};

#[derive(Debug, sqlx::FromRow)]
struct TotalsRow {
    users: i64,
    admins: i64,
    products: i64,
    categories: i64,
    images: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct PriceStatsRow {
    average: Option<Decimal>,
    min: Option<Decimal>,
    max: Option<Decimal>,
}

/// Read-only repository for dashboard statistics.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count users, admins, products, categories and images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self) -> Result<DashboardTotals, RepositoryError> {
        let row = sqlx::query_as::<_, TotalsRow>(
            r"
            SELECT
                (SELECT COUNT(*) FROM shop.user) AS users,
                (SELECT COUNT(*) FROM shop.user WHERE role = $1) AS admins,
                (SELECT COUNT(*) FROM shop.product) AS products,
                (SELECT COUNT(*) FROM shop.category) AS categories,
                (SELECT COUNT(*) FROM shop.product_image) AS images
            ",
        )
        .bind(Role::Admin)
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardTotals {
            users: row.users,
            admins: row.admins,
            products: row.products,
            categories: row.categories,
            images: row.images,
        })
    }

    /// Average (rounded to cents), minimum and maximum product price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn price_stats(&self) -> Result<PriceStats, RepositoryError> {
        let row = sqlx::query_as::<_, PriceStatsRow>(
            r"
            SELECT
                ROUND(AVG(price), 2) AS average,
                MIN(price) AS min,
                MAX(price) AS max
            FROM shop.product
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(PriceStats {
            average: row.average,
            min: row.min,
            max: row.max,
        })
    }
}
