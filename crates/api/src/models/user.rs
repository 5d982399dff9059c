//! User domain types.

use chrono::{DateTime, Utc};

use storehouse_core::{Email, Role, UserId};

/// A registered account (domain type).
///
/// Never carries the password hash; the repository hands that out separately
/// for login only.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Authorization role.
    pub role: Role,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last successful login, if any.
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Data required to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
}

/// Identity carried by a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Whether the caller may use admin endpoints.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
