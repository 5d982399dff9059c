//! Category domain types.

use chrono::{DateTime, Utc};

use storehouse_core::CategoryId;

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A category together with the number of products linked to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: Category,
    pub product_count: i64,
}
