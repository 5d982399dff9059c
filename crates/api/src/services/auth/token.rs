//! Bearer token issuance and validation (HS256 JWT).
//!
//! Tokens carry the user id in `sub` plus `email` and `role` claims. Issuer,
//! audience and expiry are checked on every request with no leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use storehouse_core::{Role, UserId};

use crate::config::JwtConfig;
use crate::models::{AuthenticatedUser, User};

/// Errors from issuing or validating a token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    role: Role,
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
    jti: String,
}

/// A signed token and the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies bearer tokens with a shared HMAC key.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime: Duration::minutes(config.expiry_minutes),
        }
    }

    /// Issue a token for `user` valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at + self.lifetime;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            role: user.role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature, issuer, audience and expiry, then extract the caller.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens and
    /// `TokenError::Invalid` for anything else that fails validation.
    pub fn validate(&self, token: &str) -> Result<AuthenticatedUser, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        let claims = data.claims;
        let id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::Invalid("subject is not a user id".to_owned()))?;

        Ok(AuthenticatedUser {
            id,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use storehouse_core::Email;

    use super::*;

    const SECRET: &str = "kR7#vQ2!pX9@mL4$wZ8&nB3*tF6^yH1%";

    fn jwt_config(issuer: &str, audience: &str, secret: &str) -> JwtConfig {
        JwtConfig {
            secret: SecretString::from(secret),
            issuer: issuer.to_owned(),
            audience: audience.to_owned(),
            expiry_minutes: 60,
        }
    }

    fn service() -> TokenService {
        TokenService::new(&jwt_config("storehouse-api", "storehouse-client", SECRET))
    }

    fn user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(42),
            email: Email::parse("jane@example.com").unwrap(),
            first_name: Some("Jane".to_owned()),
            last_name: None,
            role,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let tokens = service();
        let issued = tokens.issue(&user(Role::Admin)).unwrap();

        let caller = tokens.validate(&issued.token).unwrap();
        assert_eq!(caller.id, UserId::new(42));
        assert_eq!(caller.email, "jane@example.com");
        assert_eq!(caller.role, Role::Admin);
        assert!(issued.expires_at > Utc::now());
    }

    #[test]
    fn test_expiry_is_lifetime_after_issue() {
        let tokens = service();
        let issued_at = Utc::now();
        let issued = tokens.issue_at(&user(Role::Customer), issued_at).unwrap();
        assert_eq!(issued.expires_at, issued_at + Duration::minutes(60));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let issued = tokens
            .issue_at(&user(Role::Customer), Utc::now() - Duration::minutes(61))
            .unwrap();

        assert!(matches!(tokens.validate(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let other = TokenService::new(&jwt_config("storehouse-api", "someone-else", SECRET));
        let issued = other.issue(&user(Role::Customer)).unwrap();

        assert!(matches!(service().validate(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let other = TokenService::new(&jwt_config("impostor", "storehouse-client", SECRET));
        let issued = other.issue(&user(Role::Customer)).unwrap();

        assert!(matches!(service().validate(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let other = TokenService::new(&jwt_config(
            "storehouse-api",
            "storehouse-client",
            "Zq8!dW3#hJ6@sN1$gK5&cV9*rT2^bM7%",
        ));
        let issued = other.issue(&user(Role::Admin)).unwrap();

        assert!(matches!(service().validate(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(service().validate("not.a.jwt"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_each_token_has_unique_id() {
        let tokens = service();
        let u = user(Role::Customer);
        let now = Utc::now();
        let a = tokens.issue_at(&u, now).unwrap();
        let b = tokens.issue_at(&u, now).unwrap();
        assert_ne!(a.token, b.token);
    }
}
