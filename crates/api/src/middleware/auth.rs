//! Bearer token extractors.
//!
//! Provides extractors for requiring an authenticated caller, or an admin, in
//! route handlers.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::AuthenticatedUser;
use crate::services::TokenError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Rejects with 401 if the token is missing, malformed, or expired.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireAuth(caller): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", caller.email)
/// }
/// ```
pub struct RequireAuth(pub AuthenticatedUser);

/// Extractor that requires a valid bearer token with the `Admin` role.
///
/// Rejects with 401 without a valid token and 403 for other roles.
pub struct RequireAdmin(pub AuthenticatedUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_owned()))?;

        let caller = state.tokens().validate(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            match e {
                TokenError::Expired => AppError::Unauthorized("Token has expired".to_owned()),
                TokenError::Invalid(_) | TokenError::Signing(_) => {
                    AppError::Unauthorized("Invalid token".to_owned())
                }
            }
        })?;

        set_sentry_user(&caller.id, Some(&caller.email));
        Ok(Self(caller))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(caller) = RequireAuth::from_request_parts(parts, state).await?;

        if !caller.is_admin() {
            tracing::warn!(user_id = %caller.id, path = %parts.uri.path(), "Admin access denied");
            return Err(AppError::Forbidden("Admin role required".to_owned()));
        }

        Ok(Self(caller))
    }
}

/// Token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/auth/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap_or_default().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsed() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_scheme_case_insensitive() {
        let parts = parts_with(Some("bearer abc"));
        assert_eq!(bearer_token(&parts), Some("abc"));
    }

    #[test]
    fn test_other_schemes_ignored() {
        assert_eq!(bearer_token(&parts_with(Some("Basic dXNlcjpwdw=="))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer   "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }
}
