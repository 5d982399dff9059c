//! Registration, login, and profile handlers.

use axum::{Json, extract::State};

use crate::dto::{AuthResponse, LoginRequest, RegisterRequest, UserDto};
use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::services::AuthService;
use crate::state::AppState;

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let session = AuthService::new(state.pool(), state.tokens())
        .register(&body.as_registration())
        .await?;
    Ok(Json(session.into()))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let session = AuthService::new(state.pool(), state.tokens())
        .login(&body.email, &body.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "Login failed"))?;

    tracing::info!(user_id = %session.user.id, "User logged in");
    Ok(Json(session.into()))
}

/// `GET /api/auth/me`
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
) -> Result<Json<UserDto>> {
    let user = AuthService::new(state.pool(), state.tokens())
        .current_user(caller.id)
        .await?;
    Ok(Json(user.into()))
}
