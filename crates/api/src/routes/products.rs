//! Product catalog handlers.

use axum::{Json, extract::State, http::StatusCode};

use storehouse_core::{ProductId, ProductImageId};

use crate::dto::{
    AddImageRequest, CreateProductRequest, PagedResponse, ProductDto, ProductImageDto,
    ProductQueryParams, UpdateProductRequest,
};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::services::CatalogService;
use crate::state::AppState;

/// `GET /api/products`
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ProductQueryParams>,
) -> Result<Json<PagedResponse<ProductDto>>> {
    let (filter, request) = params.into_query().map_err(AppError::Validation)?;
    let page = CatalogService::new(state.pool())
        .search_products(&filter, request)
        .await?;
    Ok(Json(PagedResponse::from_page(page)))
}

/// `GET /api/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductDto>> {
    let product = CatalogService::new(state.pool()).product(id).await?;
    Ok(Json(product.into()))
}

/// `POST /api/products`
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(body): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductDto>)> {
    let product = body.validate().map_err(AppError::Validation)?;
    let created = CatalogService::new(state.pool())
        .create_product(&product)
        .await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// `PUT /api/products/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<UpdateProductRequest>,
) -> Result<Json<ProductDto>> {
    let changes = body.validate().map_err(AppError::Validation)?;
    let updated = CatalogService::new(state.pool())
        .update_product(id, &changes)
        .await?;
    Ok(Json(updated.into()))
}

/// `DELETE /api/products/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<StatusCode> {
    CatalogService::new(state.pool()).delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/products/{id}/images`
pub async fn add_image(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(body): ApiJson<AddImageRequest>,
) -> Result<(StatusCode, Json<ProductImageDto>)> {
    let url = body.validate().map_err(AppError::Validation)?;
    let image = CatalogService::new(state.pool()).add_image(id, &url).await?;
    Ok((StatusCode::CREATED, Json(image.into())))
}

/// `DELETE /api/products/{id}/images/{imageId}`
pub async fn remove_image(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath((id, image_id)): ApiPath<(ProductId, ProductImageId)>,
) -> Result<StatusCode> {
    CatalogService::new(state.pool())
        .remove_image(id, image_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
