//! Product domain types and the catalog search filter.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use storehouse_core::{CategoryId, Price, ProductId, ProductImageId};

use super::Category;

/// An image attached to a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// A product with its categories and images loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub categories: Vec<Category>,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Distinct, in request order.
    pub category_ids: Vec<CategoryId>,
    pub image_urls: Vec<String>,
}

/// Validated input for replacing a product's fields.
///
/// The category set is always replaced; images only when `image_urls` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category_ids: Vec<CategoryId>,
    pub image_urls: Option<Vec<String>>,
}

/// Narrowing conditions for a catalog search.
///
/// Every condition is optional; an empty filter matches all products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    search: Option<String>,
    category_ids: Vec<CategoryId>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
}

impl ProductFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match on name or description.
    ///
    /// Blank terms are ignored.
    #[must_use]
    pub fn with_search(mut self, term: Option<&str>) -> Self {
        self.search = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);
        self
    }

    /// Keep products in any of the given categories.
    #[must_use]
    pub fn with_categories(mut self, ids: Vec<CategoryId>) -> Self {
        self.category_ids = dedup_ids(ids);
        self
    }

    /// Keep products in any of the categories listed as `"1,2,3"`.
    ///
    /// Tokens that are not integers are skipped.
    #[must_use]
    pub fn with_category_list(self, raw: Option<&str>) -> Self {
        let ids = raw.map(parse_category_list).unwrap_or_default();
        self.with_categories(ids)
    }

    /// Inclusive price bounds.
    #[must_use]
    pub const fn with_price_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    #[must_use]
    pub fn category_ids(&self) -> &[CategoryId] {
        &self.category_ids
    }

    #[must_use]
    pub const fn min_price(&self) -> Option<Decimal> {
        self.min_price
    }

    #[must_use]
    pub const fn max_price(&self) -> Option<Decimal> {
        self.max_price
    }

    /// Whether no condition is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.category_ids.is_empty()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }
}

/// Parse a comma separated list of category ids, skipping invalid tokens.
#[must_use]
pub fn parse_category_list(raw: &str) -> Vec<CategoryId> {
    raw.split(',')
        .filter_map(|token| token.parse::<CategoryId>().ok())
        .collect()
}

/// Remove duplicate ids while keeping the first occurrence order.
#[must_use]
pub fn dedup_ids(ids: Vec<CategoryId>) -> Vec<CategoryId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_empty_filter() {
        let filter = ProductFilter::new()
            .with_search(Some("   "))
            .with_category_list(Some(""));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_search_is_trimmed() {
        let filter = ProductFilter::new().with_search(Some("  Coffee Mug "));
        assert_eq!(filter.search(), Some("Coffee Mug"));
    }

    #[test]
    fn test_category_list_skips_invalid_tokens() {
        let ids = parse_category_list("1, 2,abc,,3");
        let raw: Vec<i32> = ids.iter().map(CategoryId::as_i32).collect();
        assert_eq!(raw, vec![1, 2, 3]);
    }

    #[test]
    fn test_categories_are_deduplicated() {
        let filter = ProductFilter::new().with_category_list(Some("4,2,4,2,9"));
        let raw: Vec<i32> = filter.category_ids().iter().map(CategoryId::as_i32).collect();
        assert_eq!(raw, vec![4, 2, 9]);
    }

    #[test]
    fn test_price_range() {
        let min = Decimal::from_str("5.00").unwrap();
        let max = Decimal::from_str("25.50").unwrap();
        let filter = ProductFilter::new().with_price_range(Some(min), Some(max));
        assert_eq!(filter.min_price(), Some(min));
        assert_eq!(filter.max_price(), Some(max));
        assert!(!filter.is_empty());
    }
}
