//! Category handlers.

use axum::{Json, extract::State, http::StatusCode};

use storehouse_core::CategoryId;

use crate::dto::{CategoryDto, CategoryRequest};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdmin;
use crate::services::CatalogService;
use crate::state::AppState;

/// `GET /api/categories`
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CategoryDto>>> {
    let categories = CatalogService::new(state.pool()).categories().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// `GET /api/categories/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<Json<CategoryDto>> {
    let category = CatalogService::new(state.pool()).category(id).await?;
    Ok(Json(category.into()))
}

/// `POST /api/categories`
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryDto>)> {
    let name = body.validate().map_err(AppError::Validation)?;
    let category = CatalogService::new(state.pool())
        .create_category(&name)
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// `PUT /api/categories/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<CategoryId>,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> Result<Json<CategoryDto>> {
    let name = body.validate().map_err(AppError::Validation)?;
    let catalog = CatalogService::new(state.pool());
    catalog.rename_category(id, &name).await?;
    // Reload for the current product count
    let category = catalog.category(id).await?;
    Ok(Json(category.into()))
}

/// `DELETE /api/categories/{id}`
///
/// Refused with 400 while products are still assigned to the category.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<StatusCode> {
    CatalogService::new(state.pool()).delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
