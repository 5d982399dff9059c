//! Category DTOs.

use serde::{Deserialize, Serialize};

use storehouse_core::CategoryId;

use crate::models::{Category, CategorySummary};
use crate::validation::{ValidationErrors, required_text};

/// Longest accepted category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: CategoryId,
    pub name: String,
    pub product_count: i64,
}

impl From<CategorySummary> for CategoryDto {
    fn from(summary: CategorySummary) -> Self {
        Self {
            id: summary.category.id,
            name: summary.category.name,
            product_count: summary.product_count,
        }
    }
}

impl From<Category> for CategoryDto {
    /// A freshly created or renamed category; counts are not loaded.
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            product_count: 0,
        }
    }
}

/// Body of category create and rename.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
}

impl CategoryRequest {
    /// The trimmed name.
    ///
    /// # Errors
    ///
    /// Returns messages under `name` if it is blank or too long.
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &self.name, MAX_CATEGORY_NAME_LENGTH);
        errors.into_result().map(|()| name)
    }
}
