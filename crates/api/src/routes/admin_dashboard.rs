//! Admin dashboard and user administration handlers.

use axum::{Json, extract::State};

use storehouse_core::UserId;

use crate::dto::{ChangeRoleRequest, DashboardDto, PagedResponse, UserDto, UserListParams};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::services::DashboardService;
use crate::state::AppState;

/// `GET /api/admindashboard`
pub async fn summary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<DashboardDto>> {
    let summary = DashboardService::new(state.pool()).summary().await?;
    Ok(Json(summary.into()))
}

/// `GET /api/admindashboard/users`
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiQuery(params): ApiQuery<UserListParams>,
) -> Result<Json<PagedResponse<UserDto>>> {
    let page = DashboardService::new(state.pool())
        .users(params.search(), params.page_request())
        .await?;
    Ok(Json(PagedResponse::from_page(page)))
}

/// `PUT /api/admindashboard/users/{id}/role`
pub async fn change_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(body): ApiJson<ChangeRoleRequest>,
) -> Result<Json<UserDto>> {
    let role = body.validate().map_err(AppError::Validation)?;
    let user = DashboardService::new(state.pool())
        .change_role(admin.id, id, role)
        .await?;
    Ok(Json(user.into()))
}
