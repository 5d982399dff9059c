//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Errors render as a JSON
//! problem body:
//!
//! ```json
//! { "status": 400, "title": "Validation failed", "errors": { "name": ["name is required"] } }
//! ```
//!
//! Server errors are captured to Sentry and logged; their details never reach
//! the client.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CatalogError, DashboardError};
use crate::validation::ValidationErrors;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body or parameters failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, malformed, or expired credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    pub status: u16,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Auth(err) => match err {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::Token(_) | AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_problem(self) -> ProblemDetails {
        let status = self.status();
        let title = status.canonical_reason().unwrap_or("Error").to_owned();

        let (title, detail, errors) = match self {
            Self::Validation(errors) | Self::Auth(AuthError::Validation(errors)) => {
                ("Validation failed".to_owned(), None, Some(errors))
            }
            Self::Auth(AuthError::InvalidCredentials) => {
                (title, Some("Invalid email or password".to_owned()), None)
            }
            Self::Auth(AuthError::UserNotFound) => {
                (title, Some("Account no longer exists".to_owned()), None)
            }
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) | Self::Auth(_) => {
                (title, Some("An unexpected error occurred".to_owned()), None)
            }
            Self::NotFound(detail)
            | Self::Unauthorized(detail)
            | Self::Forbidden(detail)
            | Self::BadRequest(detail) => (title, Some(detail), None),
        };

        ProblemDetails {
            status: status.as_u16(),
            title,
            detail,
            errors,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(self.into_problem())).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(errors) => Self::Validation(errors),
            CatalogError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            CatalogError::CategoryInUse(_) => Self::BadRequest(
                "Category is assigned to products and cannot be deleted".to_owned(),
            ),
            CatalogError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::UserNotFound => Self::NotFound("user not found".to_owned()),
            DashboardError::SelfDemotion => {
                Self::BadRequest("You cannot remove your own admin role".to_owned())
            }
            DashboardError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::TokenError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_json(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation(ValidationErrors::single("name", "x"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Token(TokenError::Expired))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_catalog_error_mapping() {
        assert_eq!(
            get_status(CatalogError::CategoryInUse(storehouse_core::CategoryId::new(1)).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CatalogError::NotFound("product").into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_dashboard_error_mapping() {
        assert_eq!(
            get_status(DashboardError::SelfDemotion.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(DashboardError::UserNotFound.into()),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_field_errors() {
        let mut errors = ValidationErrors::new();
        errors.add("password", "password must contain a digit");
        let body = body_json(AppError::Validation(errors)).await;

        assert_eq!(body["status"], 400);
        assert_eq!(body["title"], "Validation failed");
        assert_eq!(body["errors"]["password"][0], "password must contain a digit");
        assert!(body.get("detail").is_none());
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let body = body_json(AppError::Internal("connection refused at 10.0.0.5".to_owned())).await;

        assert_eq!(body["status"], 500);
        assert_eq!(body["detail"], "An unexpected error occurred");
        assert!(!body.to_string().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_login_failure_is_generic() {
        let body = body_json(AppError::Auth(AuthError::InvalidCredentials)).await;
        assert_eq!(body["status"], 401);
        assert_eq!(body["detail"], "Invalid email or password");
    }
}
