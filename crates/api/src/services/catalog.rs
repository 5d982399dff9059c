//! Catalog service: products, categories, and the rules that tie them together.
//!
//! Category ids on product writes are checked before anything is written,
//! and categories still linked to products cannot be deleted.

use sqlx::PgPool;
use thiserror::Error;

use storehouse_core::{CategoryId, ProductId, ProductImageId};

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::models::{
    Category, CategorySummary, NewProduct, Page, PageRequest, Product, ProductChanges,
    ProductFilter, ProductImage,
};
use crate::validation::ValidationErrors;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input refers to missing categories or reuses a taken name.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The addressed product, category, or image does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The category is still linked to at least one product.
    #[error("category {0} is still assigned to products")]
    CategoryInUse(CategoryId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Catalog service over the product and category repositories.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    categories: CategoryRepository<'a>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
            categories: CategoryRepository::new(pool),
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Filter and paginate products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if a query fails.
    pub async fn search_products(
        &self,
        filter: &ProductFilter,
        request: PageRequest,
    ) -> Result<Page<Product>, CatalogError> {
        Ok(self.products.search(filter, request).await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product doesn't exist.
    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products
            .get(id)
            .await?
            .ok_or(CatalogError::NotFound("product"))
    }

    /// Create a product after checking its categories exist.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` listing unknown category ids.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, CatalogError> {
        self.ensure_categories_exist(&product.category_ids).await?;

        let created = self
            .products
            .create(product)
            .await
            .map_err(category_race)?;

        tracing::info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    /// Replace a product's fields and category set.
    ///
    /// A missing product is reported before its category ids are checked.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product doesn't exist and
    /// `CatalogError::Validation` listing unknown category ids.
    pub async fn update_product(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, CatalogError> {
        if !self.products.exists(id).await? {
            return Err(CatalogError::NotFound("product"));
        }
        self.ensure_categories_exist(&changes.category_ids).await?;

        let updated = self
            .products
            .update(id, changes)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::NotFound("product"),
                other => category_race(other),
            })?;

        tracing::info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if nothing was deleted.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        self.products.delete(id).await.map_err(not_found("product"))?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product doesn't exist.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        url: &str,
    ) -> Result<ProductImage, CatalogError> {
        self.products
            .add_image(product_id, url)
            .await
            .map_err(not_found("product"))
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the image isn't on that product.
    pub async fn remove_image(
        &self,
        product_id: ProductId,
        image_id: ProductImageId,
    ) -> Result<(), CatalogError> {
        self.products
            .remove_image(product_id, image_id)
            .await
            .map_err(not_found("image"))
    }

    async fn ensure_categories_exist(&self, ids: &[CategoryId]) -> Result<(), CatalogError> {
        let missing = self.categories.find_missing(ids).await?;
        if missing.is_empty() {
            return Ok(());
        }
        Err(CatalogError::Validation(unknown_categories(&missing)))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn categories(&self) -> Result<Vec<CategorySummary>, CatalogError> {
        Ok(self.categories.list().await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the category doesn't exist.
    pub async fn category(&self, id: CategoryId) -> Result<CategorySummary, CatalogError> {
        self.categories
            .get(id)
            .await?
            .ok_or(CatalogError::NotFound("category"))
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Validation` under `name` if the name is taken.
    pub async fn create_category(&self, name: &str) -> Result<Category, CatalogError> {
        let category = self
            .categories
            .create(name)
            .await
            .map_err(duplicate_name)?;

        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the category doesn't exist and
    /// `CatalogError::Validation` under `name` if the name is taken.
    pub async fn rename_category(
        &self,
        id: CategoryId,
        name: &str,
    ) -> Result<Category, CatalogError> {
        self.categories
            .rename(id, name)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::NotFound("category"),
                other => duplicate_name(other),
            })
    }

    /// Delete a category no product uses.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CategoryInUse` while products reference it and
    /// `CatalogError::NotFound` if it doesn't exist.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), CatalogError> {
        self.categories.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => CatalogError::NotFound("category"),
            RepositoryError::InUse(_) => CatalogError::CategoryInUse(id),
            other => CatalogError::Repository(other),
        })?;

        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}

fn unknown_categories(missing: &[CategoryId]) -> ValidationErrors {
    let ids = missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    ValidationErrors::single("categoryIds", format!("unknown category ids: {ids}"))
}

/// A category deleted between the existence check and the insert.
fn category_race(error: RepositoryError) -> CatalogError {
    match error {
        RepositoryError::InUse(_) => CatalogError::Validation(ValidationErrors::single(
            "categoryIds",
            "one or more categories no longer exist",
        )),
        other => CatalogError::Repository(other),
    }
}

fn duplicate_name(error: RepositoryError) -> CatalogError {
    match error {
        RepositoryError::Conflict(_) => CatalogError::Validation(ValidationErrors::single(
            "name",
            "a category with this name already exists",
        )),
        other => CatalogError::Repository(other),
    }
}

fn not_found(what: &'static str) -> impl Fn(RepositoryError) -> CatalogError {
    move |e| match e {
        RepositoryError::NotFound => CatalogError::NotFound(what),
        other => CatalogError::Repository(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_categories_lists_ids() {
        let errors = unknown_categories(&[CategoryId::new(7), CategoryId::new(9)]);
        assert_eq!(
            errors.field("categoryIds"),
            ["unknown category ids: 7, 9".to_string()]
        );
    }

    #[test]
    fn test_category_race_maps_to_validation() {
        let err = category_race(RepositoryError::InUse("gone".to_owned()));
        assert!(matches!(err, CatalogError::Validation(ref e) if !e.field("categoryIds").is_empty()));

        let err = category_race(RepositoryError::NotFound);
        assert!(matches!(err, CatalogError::Repository(RepositoryError::NotFound)));
    }

    #[test]
    fn test_duplicate_name_maps_to_name_field() {
        let err = duplicate_name(RepositoryError::Conflict("dup".to_owned()));
        assert!(matches!(err, CatalogError::Validation(ref e) if e.field("name").len() == 1));
    }

    #[test]
    fn test_not_found_mapper() {
        let map = not_found("image");
        assert!(matches!(map(RepositoryError::NotFound), CatalogError::NotFound("image")));
        assert!(matches!(
            map(RepositoryError::DataCorruption("x".to_owned())),
            CatalogError::Repository(_)
        ));
    }
}
