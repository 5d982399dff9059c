//! Product repository and catalog search.
//!
//! Searches build one `WHERE` clause with [`push_filters`] and run it twice:
//! once for the total count and once for the requested page. Categories and
//! images for the page are then loaded in two batched queries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use storehouse_core::{CategoryId, Price, ProductId, ProductImageId};

use super::{RepositoryError, contains_pattern};
use crate::models::{
    Category, NewProduct, Page, PageRequest, Product, ProductChanges, ProductFilter, ProductImage,
};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.created_at, p.updated_at";
const UNKNOWN_CATEGORY: &str = "category does not exist";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Price,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductCategoryRow {
    product_id: i32,
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductImageRow {
    id: i32,
    product_id: i32,
    url: String,
    created_at: DateTime<Utc>,
}

impl From<ProductImageRow> for ProductImage {
    fn from(row: ProductImageRow) -> Self {
        Self {
            id: ProductImageId::new(row.id),
            product_id: ProductId::new(row.product_id),
            url: row.url,
            created_at: row.created_at,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Filter, count and paginate the catalog ordered by product id.
    ///
    /// A page past the end returns no items but the real total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn search(
        &self,
        filter: &ProductFilter,
        request: PageRequest,
    ) -> Result<Page<Product>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM shop.product p");
        push_filters(&mut count, filter);
        let total_count: i64 = count.build_query_scalar::<i64>().fetch_one(self.pool).await?;

        if request.is_beyond(total_count) {
            return Ok(Page::empty(request, total_count));
        }

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM shop.product p"));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY p.id LIMIT ")
            .push_bind(request.limit())
            .push(" OFFSET ")
            .push_bind(request.offset());

        let rows: Vec<ProductRow> = select.build_query_as().fetch_all(self.pool).await?;
        let products = self.hydrate(rows).await?;

        Ok(Page::new(products, request, total_count))
    }

    /// Get a product with its categories and images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(self.hydrate(vec![row]).await?.pop())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let found =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM shop.product WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        Ok(found)
    }

    /// Most recently created products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product p ORDER BY p.created_at DESC, p.id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        self.hydrate(rows).await
    }

    /// Insert a product with its category links and images.
    ///
    /// Category ids must already have been checked; a category removed in
    /// the meantime surfaces as `RepositoryError::InUse`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO shop.product (name, description, price)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .fetch_one(&mut *tx)
        .await?;
        let id = ProductId::new(id);

        link_categories(&mut tx, id, &product.category_ids).await?;
        insert_images(&mut tx, id, &product.image_urls).await?;

        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace a product's fields and category set, and its images when given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_scalar::<_, i32>(
            r"
            UPDATE shop.product
            SET name = $2, description = $3, price = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            ",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM shop.product_category WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_categories(&mut tx, id, &changes.category_ids).await?;

        if let Some(urls) = &changes.image_urls {
            sqlx::query("DELETE FROM shop.product_image WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_images(&mut tx, id, urls).await?;
        }

        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product; its images and category links cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was deleted, including
    /// when a concurrent request removed it first.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Attach an image to a product and bump its `updated_at` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        url: &str,
    ) -> Result<ProductImage, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProductImageRow>(
            r"
            INSERT INTO shop.product_image (product_id, url)
            VALUES ($1, $2)
            RETURNING id, product_id, url, created_at
            ",
        )
        .bind(product_id)
        .bind(url)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match RepositoryError::from_constraint(e, "duplicate image", "product") {
            RepositoryError::InUse(_) => RepositoryError::NotFound,
            other => other,
        })?;

        sqlx::query("UPDATE shop.product SET updated_at = NOW() WHERE id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Remove one image from a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image doesn't belong to the product.
    pub async fn remove_image(
        &self,
        product_id: ProductId,
        image_id: ProductImageId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product_image WHERE id = $1 AND product_id = $2")
            .bind(image_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Attach categories and images to bare product rows, keeping row order.
    async fn hydrate(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        let category_rows = sqlx::query_as::<_, ProductCategoryRow>(
            r"
            SELECT pc.product_id, c.id, c.name, c.created_at
            FROM shop.product_category pc
            JOIN shop.category c ON c.id = pc.category_id
            WHERE pc.product_id = ANY($1)
            ORDER BY LOWER(c.name), c.id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let image_rows = sqlx::query_as::<_, ProductImageRow>(
            r"
            SELECT id, product_id, url, created_at
            FROM shop.product_image
            WHERE product_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut categories: HashMap<i32, Vec<Category>> = HashMap::new();
        for row in category_rows {
            categories.entry(row.product_id).or_default().push(Category {
                id: CategoryId::new(row.id),
                name: row.name,
                created_at: row.created_at,
            });
        }

        let mut images: HashMap<i32, Vec<ProductImage>> = HashMap::new();
        for row in image_rows {
            images.entry(row.product_id).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| Product {
                id: ProductId::new(row.id),
                categories: categories.remove(&row.id).unwrap_or_default(),
                images: images.remove(&row.id).unwrap_or_default(),
                name: row.name,
                description: row.description,
                price: row.price,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}

/// Append the `WHERE` clause for `filter` to a query over `shop.product p`.
///
/// Conditions are only added for the parts of the filter that are set.
pub fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    builder.push(" WHERE TRUE");

    if let Some(term) = filter.search() {
        let pattern = contains_pattern(term);
        builder
            .push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if !filter.category_ids().is_empty() {
        let ids: Vec<i32> = filter.category_ids().iter().map(CategoryId::as_i32).collect();
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM shop.product_category pc \
                 WHERE pc.product_id = p.id AND pc.category_id = ANY(",
            )
            .push_bind(ids)
            .push("))");
    }

    if let Some(min) = filter.min_price() {
        builder.push(" AND p.price >= ").push_bind(min);
    }

    if let Some(max) = filter.max_price() {
        builder.push(" AND p.price <= ").push_bind(max);
    }
}

async fn link_categories(
    conn: &mut PgConnection,
    product_id: ProductId,
    category_ids: &[CategoryId],
) -> Result<(), RepositoryError> {
    if category_ids.is_empty() {
        return Ok(());
    }

    let ids: Vec<i32> = category_ids.iter().map(CategoryId::as_i32).collect();
    sqlx::query(
        r"
        INSERT INTO shop.product_category (product_id, category_id)
        SELECT $1, UNNEST($2::INTEGER[])
        ON CONFLICT DO NOTHING
        ",
    )
    .bind(product_id)
    .bind(&ids)
    .execute(conn)
    .await
    .map_err(|e| RepositoryError::from_constraint(e, "duplicate category link", UNKNOWN_CATEGORY))?;

    Ok(())
}

async fn insert_images(
    conn: &mut PgConnection,
    product_id: ProductId,
    urls: &[String],
) -> Result<(), RepositoryError> {
    if urls.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r"
        INSERT INTO shop.product_image (product_id, url)
        SELECT $1, UNNEST($2::TEXT[])
        ",
    )
    .bind(product_id)
    .bind(urls)
    .execute(conn)
    .await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    fn where_clause(filter: &ProductFilter) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM shop.product p");
        push_filters(&mut builder, filter);
        builder.sql().to_string()
    }

    #[test]
    fn test_empty_filter_adds_no_conditions() {
        assert_eq!(
            where_clause(&ProductFilter::new()),
            "SELECT COUNT(*) FROM shop.product p WHERE TRUE"
        );
    }

    #[test]
    fn test_search_matches_name_or_description() {
        let sql = where_clause(&ProductFilter::new().with_search(Some("mug")));
        assert!(sql.contains("p.name ILIKE $1 OR p.description ILIKE $2"));
    }

    #[test]
    fn test_all_conditions_number_binds_in_order() {
        let filter = ProductFilter::new()
            .with_search(Some("mug"))
            .with_category_list(Some("1,2"))
            .with_price_range(
                Some(Decimal::from_str("1").unwrap()),
                Some(Decimal::from_str("9").unwrap()),
            );
        let sql = where_clause(&filter);

        assert!(sql.contains("pc.category_id = ANY($3)"));
        assert!(sql.contains("p.price >= $4"));
        assert!(sql.contains("p.price <= $5"));
    }

    #[test]
    fn test_only_price_ceiling() {
        let filter =
            ProductFilter::new().with_price_range(None, Some(Decimal::from_str("20").unwrap()));
        let sql = where_clause(&filter);
        assert!(sql.ends_with("WHERE TRUE AND p.price <= $1"));
        assert!(!sql.contains("ILIKE"));
    }
}
