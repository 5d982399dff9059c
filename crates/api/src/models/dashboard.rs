//! Admin dashboard aggregates.

use rust_decimal::Decimal;

use super::{CategorySummary, Product, User};

/// Row counts across the catalog and user tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardTotals {
    pub users: i64,
    pub admins: i64,
    pub products: i64,
    pub categories: i64,
    pub images: i64,
}

/// Price statistics; all `None` when the catalog is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceStats {
    pub average: Option<Decimal>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

/// Everything the admin dashboard shows in one response.
#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub totals: DashboardTotals,
    pub prices: PriceStats,
    pub categories: Vec<CategorySummary>,
    pub recent_products: Vec<Product>,
    pub recent_users: Vec<User>,
}
