//! Auth request and response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storehouse_core::{Role, UserId};

use crate::models::User;
use crate::services::AuthSession;
use crate::services::auth::Registration;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl RegisterRequest {
    #[must_use]
    pub fn as_registration(&self) -> Registration<'_> {
        Registration {
            email: &self.email,
            password: &self.password,
            first_name: self.first_name.as_deref(),
            last_name: self.last_name.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: UserId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email.into_inner(),
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Returned by register and login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserDto,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token.token,
            expires_at: session.token.expires_at,
            user: session.user.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storehouse_core::Email;

    use super::*;

    #[test]
    fn test_register_request_accepts_missing_names() {
        let request: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@b.co","password":"Str0ng!pass"}"#).unwrap();
        let registration = request.as_registration();
        assert_eq!(registration.email, "a@b.co");
        assert!(registration.first_name.is_none());
    }

    #[test]
    fn test_user_dto_never_has_password() {
        let now = Utc::now();
        let dto = UserDto::from(User {
            id: UserId::new(5),
            email: Email::parse("jane@example.com").unwrap(),
            first_name: Some("Jane".to_owned()),
            last_name: Some("Doe".to_owned()),
            role: Role::Admin,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        });
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["id"], 5);
        assert_eq!(json["email"], "jane@example.com");
        assert_eq!(json["firstName"], "Jane");
        assert_eq!(json["role"], "Admin");
        assert!(json["lastLoginAt"].is_null());
        assert!(json.get("passwordHash").is_none());
    }
}
