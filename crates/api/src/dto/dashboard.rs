//! Admin dashboard DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storehouse_core::Role;

use super::{CategoryDto, ProductDto, UserDto, lenient_i64};
use crate::models::{DashboardSummary, PageRequest};
use crate::validation::ValidationErrors;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDto {
    pub total_users: i64,
    pub total_admins: i64,
    pub total_products: i64,
    pub total_categories: i64,
    pub total_images: i64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub min_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub max_price: Option<Decimal>,
    pub products_per_category: Vec<CategoryDto>,
    pub recent_products: Vec<ProductDto>,
    pub recent_users: Vec<UserDto>,
}

impl From<DashboardSummary> for DashboardDto {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            total_users: summary.totals.users,
            total_admins: summary.totals.admins,
            total_products: summary.totals.products,
            total_categories: summary.totals.categories,
            total_images: summary.totals.images,
            average_price: summary.prices.average,
            min_price: summary.prices.min,
            max_price: summary.prices.max,
            products_per_category: summary.categories.into_iter().map(Into::into).collect(),
            recent_products: summary.recent_products.into_iter().map(Into::into).collect(),
            recent_users: summary.recent_users.into_iter().map(Into::into).collect(),
        }
    }
}

/// Query string of `GET /api/admindashboard/users`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListParams {
    pub page_number: Option<String>,
    pub page_size: Option<String>,
    pub search: Option<String>,
}

impl UserListParams {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            lenient_i64(self.page_number.as_deref()),
            lenient_i64(self.page_size.as_deref()),
        )
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Body of `PUT /api/admindashboard/users/{id}/role`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    #[serde(default)]
    pub role: String,
}

impl ChangeRoleRequest {
    /// # Errors
    ///
    /// Returns a message under `role` for unknown role names.
    pub fn validate(&self) -> Result<Role, ValidationErrors> {
        self.role
            .parse::<Role>()
            .map_err(|e| ValidationErrors::single("role", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DashboardTotals, PriceStats};

    #[test]
    fn test_role_parsing() {
        let request = ChangeRoleRequest {
            role: "admin".to_owned(),
        };
        assert_eq!(request.validate().ok(), Some(Role::Admin));

        let request = ChangeRoleRequest {
            role: "Owner".to_owned(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_user_list_params() {
        let params = UserListParams {
            page_number: Some("-4".to_owned()),
            page_size: None,
            search: Some("   ".to_owned()),
        };
        assert_eq!(params.page_request().page_number(), 1);
        assert_eq!(params.search(), None);
    }

    #[test]
    fn test_empty_catalog_prices_are_null() {
        let dto = DashboardDto::from(DashboardSummary {
            totals: DashboardTotals::default(),
            prices: PriceStats::default(),
            categories: Vec::new(),
            recent_products: Vec::new(),
            recent_users: Vec::new(),
        });
        let json = serde_json::to_value(&dto).unwrap_or_default();

        assert_eq!(json["totalUsers"], 0);
        assert!(json["averagePrice"].is_null());
        assert_eq!(json["productsPerCategory"], serde_json::json!([]));
    }

    #[test]
    fn test_prices_serialize_as_numbers() {
        let dto = DashboardDto::from(DashboardSummary {
            totals: DashboardTotals::default(),
            prices: PriceStats {
                average: Some(Decimal::new(1250, 2)),
                min: Some(Decimal::new(500, 2)),
                max: Some(Decimal::new(2000, 2)),
            },
            categories: Vec::new(),
            recent_products: Vec::new(),
            recent_users: Vec::new(),
        });
        let json = serde_json::to_value(&dto).unwrap_or_default();
        assert_eq!(json["averagePrice"], serde_json::json!(12.5));
        assert_eq!(json["maxPrice"], serde_json::json!(20.0));
    }
}
