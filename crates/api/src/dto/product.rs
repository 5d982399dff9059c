//! Product DTOs and catalog query parameters.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storehouse_core::{CategoryId, Price, ProductId, ProductImageId};

use super::lenient_i64;
use crate::models::{
    Category, NewProduct, PageRequest, Product, ProductChanges, ProductFilter, ProductImage,
    product::dedup_ids,
};
use crate::validation::{ValidationErrors, required_text};

pub const MAX_PRODUCT_NAME_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 4000;
pub const MAX_IMAGE_URL_LENGTH: usize = 2048;

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategoryDto {
    pub id: CategoryId,
    pub name: String,
}

impl From<Category> for ProductCategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageDto {
    pub id: ProductImageId,
    pub url: String,
}

impl From<ProductImage> for ProductImageDto {
    fn from(image: ProductImage) -> Self {
        Self {
            id: image.id,
            url: image.url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category_ids: Vec<CategoryId>,
    pub categories: Vec<ProductCategoryDto>,
    pub images: Vec<ProductImageDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price.amount(),
            category_ids: product.categories.iter().map(|c| c.id).collect(),
            categories: product.categories.into_iter().map(Into::into).collect(),
            images: product.images.into_iter().map(Into::into).collect(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /api/products`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl CreateProductRequest {
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self) -> Result<NewProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let fields = ProductFields::validate(
            &mut errors,
            &self.name,
            &self.description,
            self.price,
            &self.category_ids,
        );
        let image_urls = validate_image_urls(&mut errors, &self.image_urls);

        match fields.price {
            Some(price) if errors.is_empty() => Ok(NewProduct {
                name: fields.name,
                description: fields.description,
                price,
                category_ids: fields.category_ids,
                image_urls,
            }),
            _ => Err(errors),
        }
    }
}

/// Body of `PUT /api/products/{id}`.
///
/// Omitting `imageUrls` keeps the current images; an empty list removes them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    pub image_urls: Option<Vec<String>>,
}

impl UpdateProductRequest {
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self) -> Result<ProductChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let fields = ProductFields::validate(
            &mut errors,
            &self.name,
            &self.description,
            self.price,
            &self.category_ids,
        );
        let image_urls = self
            .image_urls
            .as_deref()
            .map(|urls| validate_image_urls(&mut errors, urls));

        match fields.price {
            Some(price) if errors.is_empty() => Ok(ProductChanges {
                name: fields.name,
                description: fields.description,
                price,
                category_ids: fields.category_ids,
                image_urls,
            }),
            _ => Err(errors),
        }
    }
}

/// Body of `POST /api/products/{id}/images`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddImageRequest {
    #[serde(default)]
    pub url: String,
}

impl AddImageRequest {
    /// # Errors
    ///
    /// Returns a message under `url` if the URL is unusable.
    pub fn validate(&self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let url = validate_image_url(&mut errors, "url", &self.url);
        errors.into_result().map(|()| url)
    }
}

/// Fields shared by create and update.
struct ProductFields {
    name: String,
    description: String,
    price: Option<Price>,
    category_ids: Vec<CategoryId>,
}

impl ProductFields {
    fn validate(
        errors: &mut ValidationErrors,
        name: &str,
        description: &str,
        price: Option<Decimal>,
        category_ids: &[CategoryId],
    ) -> Self {
        let name = required_text(errors, "name", name, MAX_PRODUCT_NAME_LENGTH);

        let description = description.trim().to_owned();
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            errors.add(
                "description",
                format!("description must be at most {MAX_DESCRIPTION_LENGTH} characters"),
            );
        }

        let price = match price {
            None => {
                errors.add("price", "price is required");
                None
            }
            Some(amount) => Price::new(amount)
                .map_err(|e| errors.add("price", e.to_string()))
                .ok(),
        };

        Self {
            name,
            description,
            price,
            category_ids: dedup_ids(category_ids.to_vec()),
        }
    }
}

fn validate_image_urls(errors: &mut ValidationErrors, urls: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    urls.iter()
        .map(|url| validate_image_url(errors, "imageUrls", url))
        .filter(|url| !url.is_empty() && seen.insert(url.clone()))
        .collect()
}

/// Absolute `http(s)` URLs or site-relative paths.
fn validate_image_url(errors: &mut ValidationErrors, field: &str, url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        errors.add(field, "image URL cannot be empty");
    } else if url.len() > MAX_IMAGE_URL_LENGTH {
        errors.add(
            field,
            format!("image URL must be at most {MAX_IMAGE_URL_LENGTH} characters"),
        );
    } else if !(url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/'))
        || url.chars().any(char::is_whitespace)
    {
        errors.add(field, format!("'{url}' is not a valid image URL"));
    }
    url.to_owned()
}

// =============================================================================
// Query
// =============================================================================

/// Query string of `GET /api/products`.
///
/// Everything arrives as text so blank values mean "not set".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQueryParams {
    pub page_number: Option<String>,
    pub page_size: Option<String>,
    pub search: Option<String>,
    pub categories: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl ProductQueryParams {
    /// Build the filter and page request.
    ///
    /// Page values are clamped and non-numeric category tokens are skipped.
    ///
    /// # Errors
    ///
    /// Returns messages under `minPrice`/`maxPrice` for non-numeric bounds.
    pub fn into_query(self) -> Result<(ProductFilter, PageRequest), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let min_price = parse_price_bound(&mut errors, "minPrice", self.min_price.as_deref());
        let max_price = parse_price_bound(&mut errors, "maxPrice", self.max_price.as_deref());
        errors.into_result()?;

        let filter = ProductFilter::new()
            .with_search(self.search.as_deref())
            .with_category_list(self.categories.as_deref())
            .with_price_range(min_price, max_price);

        let request = PageRequest::new(
            lenient_i64(self.page_number.as_deref()),
            lenient_i64(self.page_size.as_deref()),
        );

        Ok((filter, request))
    }
}

fn parse_price_bound(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
) -> Option<Decimal> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    Decimal::from_str(raw)
        .map_err(|_| errors.add(field, format!("{field} must be a number")))
        .ok()
}
