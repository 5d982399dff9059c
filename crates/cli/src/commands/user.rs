//! User account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the first admin (accounts created over HTTP are always customers)
//! sh-cli user create -e admin@example.com -p 'Adm1n!pass' -r admin
//!
//! # Change a role
//! sh-cli user set-role -e shopper@example.com -r admin
//!
//! # Reset a password
//! sh-cli user reset-password -e shopper@example.com -p 'N3w!password'
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use storehouse_api::db::{RepositoryError, UserRepository};
use storehouse_api::models::NewUser;
use storehouse_api::services::AuthError;
use storehouse_api::services::auth::{hash_password, password_policy_violations};
use storehouse_core::{Email, Role};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, customer")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password does not satisfy the policy.
    #[error("Weak password: {}", .0.join("; "))]
    WeakPassword(Vec<String>),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// No user with that email.
    #[error("No user with email: {0}")]
    UserNotFound(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),

    /// Database error.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Arguments for [`create`].
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub role: &'a str,
}

/// Create a new user with the given role.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError` if the input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create(account: &NewAccount<'_>) -> Result<i32, UserError> {
    let role = parse_role(account.role)?;
    let email = parse_email(account.email)?;
    let password_hash = checked_hash(account.password)?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    tracing::info!("Creating user: {} ({})", email, role);

    let user = users
        .create(&NewUser {
            email: email.clone(),
            password_hash,
            first_name: trimmed(account.first_name),
            last_name: trimmed(account.last_name),
            role,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(email.to_string()),
            other => UserError::Repository(other),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user.id.as_i32())
}

/// Change the role of the user with the given email.
///
/// # Errors
///
/// Returns `UserError::UserNotFound` if no account has that email.
pub async fn set_role(email: &str, role: &str) -> Result<(), UserError> {
    let role = parse_role(role)?;
    let email = parse_email(email)?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| UserError::UserNotFound(email.to_string()))?;

    if user.role == role {
        tracing::info!("{} already has role {}", user.email, role);
        return Ok(());
    }

    let user = users.set_role(user.id, role).await?;
    tracing::info!("Role of {} changed to {}", user.email, user.role);
    Ok(())
}

/// Replace the password of the user with the given email.
///
/// # Errors
///
/// Returns `UserError::WeakPassword` if the password violates the policy and
/// `UserError::UserNotFound` if no account has that email.
pub async fn reset_password(email: &str, password: &str) -> Result<(), UserError> {
    let email = parse_email(email)?;
    let password_hash = checked_hash(password)?;

    let pool = connect().await?;
    UserRepository::new(&pool)
        .set_password_hash(&email, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => UserError::UserNotFound(email.to_string()),
            other => UserError::Repository(other),
        })?;

    tracing::info!("Password updated for {}", email);
    Ok(())
}

fn parse_role(raw: &str) -> Result<Role, UserError> {
    raw.parse()
        .map_err(|_| UserError::InvalidRole(raw.to_owned()))
}

fn parse_email(raw: &str) -> Result<Email, UserError> {
    Email::parse(raw.trim())
        .map(|email| email.normalized())
        .map_err(|_| UserError::InvalidEmail(raw.to_owned()))
}

fn checked_hash(password: &str) -> Result<String, UserError> {
    let violations = password_policy_violations(password);
    if !violations.is_empty() {
        return Err(UserError::WeakPassword(violations));
    }
    Ok(hash_password(password)?)
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_accepts_any_case() {
        assert_eq!(parse_role("Admin").unwrap(), Role::Admin);
        assert_eq!(parse_role("customer").unwrap(), Role::Customer);
        assert!(matches!(
            parse_role("super_admin"),
            Err(UserError::InvalidRole(_))
        ));
    }

    #[test]
    fn test_parse_email_normalizes() {
        let email = parse_email("  Admin@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "admin@example.com");
        assert!(matches!(
            parse_email("not-an-email"),
            Err(UserError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_weak_password_rejected_before_hashing() {
        let Err(UserError::WeakPassword(violations)) = checked_hash("short") else {
            panic!("expected weak password error");
        };
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_strong_password_hashed() {
        let hash = checked_hash("Str0ng!pass").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_trimmed_drops_blank() {
        assert_eq!(trimmed(Some("  Ada ")), Some("Ada".to_owned()));
        assert_eq!(trimmed(Some("   ")), None);
        assert_eq!(trimmed(None), None);
    }
}
