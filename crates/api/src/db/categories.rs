//! Category repository.
//!
//! Deleting a category is refused while any product links to it. The check
//! runs inside the delete transaction and the `ON DELETE RESTRICT` foreign key
//! catches anything that slips past it.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use storehouse_core::CategoryId;

use super::RepositoryError;
use crate::models::{Category, CategorySummary};

const DUPLICATE_NAME: &str = "category name already exists";
const CATEGORY_IN_USE: &str = "category is referenced by products";

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategorySummaryRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    product_count: i64,
}

impl From<CategorySummaryRow> for CategorySummary {
    fn from(row: CategorySummaryRow) -> Self {
        Self {
            category: row.category.into(),
            product_count: row.product_count,
        }
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories ordered by name, with product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CategorySummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategorySummaryRow>(
            r"
            SELECT c.id, c.name, c.created_at, COUNT(pc.product_id) AS product_count
            FROM shop.category c
            LEFT JOIN shop.product_category pc ON pc.category_id = c.id
            GROUP BY c.id
            ORDER BY LOWER(c.name), c.id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CategorySummary::from).collect())
    }

    /// A single category with its product count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<CategorySummary>, RepositoryError> {
        let row = sqlx::query_as::<_, CategorySummaryRow>(
            r"
            SELECT c.id, c.name, c.created_at, COUNT(pc.product_id) AS product_count
            FROM shop.category c
            LEFT JOIN shop.product_category pc ON pc.category_id = c.id
            WHERE c.id = $1
            GROUP BY c.id
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(CategorySummary::from))
    }

    /// Look up a category by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, created_at FROM shop.category WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    /// Return the ids from `ids` that have no category row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_missing(&self, ids: &[CategoryId]) -> Result<Vec<CategoryId>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i32> = ids.iter().map(CategoryId::as_i32).collect();
        let existing: HashSet<i32> =
            sqlx::query_scalar::<_, i32>("SELECT id FROM shop.category WHERE id = ANY($1)")
                .bind(&raw)
                .fetch_all(self.pool)
                .await?
                .into_iter()
                .collect();

        Ok(ids
            .iter()
            .copied()
            .filter(|id| !existing.contains(&id.as_i32()))
            .collect())
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, name: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO shop.category (name)
            VALUES ($1)
            RETURNING id, name, created_at
            ",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, DUPLICATE_NAME, CATEGORY_IN_USE))?;

        Ok(row.into())
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist and
    /// `RepositoryError::Conflict` if the new name is taken.
    pub async fn rename(&self, id: CategoryId, name: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            UPDATE shop.category SET name = $2
            WHERE id = $1
            RETURNING id, name, created_at
            ",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_constraint(e, DUPLICATE_NAME, CATEGORY_IN_USE))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a category that no product references.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InUse` if products still link to it and
    /// `RepositoryError::NotFound` if no row was deleted.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM shop.product_category WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if in_use {
            return Err(RepositoryError::InUse(CATEGORY_IN_USE.to_owned()));
        }

        let result = sqlx::query("DELETE FROM shop.category WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_constraint(e, DUPLICATE_NAME, CATEGORY_IN_USE))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}
