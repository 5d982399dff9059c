//! Authentication service.
//!
//! Password registration and login backed by Argon2id hashes, with bearer
//! tokens issued by [`TokenService`].

mod error;
mod token;

pub use error::AuthError;
pub use token::{IssuedToken, TokenError, TokenService};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use storehouse_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{NewUser, User};
use crate::validation::ValidationErrors;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length; bounds hashing cost.
pub const MAX_PASSWORD_LENGTH: usize = 128;

const MAX_NAME_LENGTH: usize = 100;

/// Verified against when no account matches the login email.
static UNKNOWN_ACCOUNT_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unknown-account-Passw0rd!").ok());

/// Input for a new account.
#[derive(Debug, Clone)]
pub struct Registration<'r> {
    pub email: &'r str,
    pub password: &'r str,
    pub first_name: Option<&'r str>,
    pub last_name: Option<&'r str>,
}

/// A user together with a freshly issued token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: IssuedToken,
}

/// Authentication service.
///
/// Handles registration, login, and profile lookup.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new customer account and sign them in.
    ///
    /// Every problem with the input is reported at once under its field name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a malformed email, a password that
    /// fails the policy, overlong names, or an email that is already registered.
    pub async fn register(&self, registration: &Registration<'_>) -> Result<AuthSession, AuthError> {
        let mut errors = ValidationErrors::new();

        let email = match Email::parse(registration.email.trim()) {
            Ok(email) => Some(email.normalized()),
            Err(e) => {
                errors.add("email", e.to_string());
                None
            }
        };

        for message in password_policy_violations(registration.password) {
            errors.add("password", message);
        }

        let first_name = optional_name(&mut errors, "firstName", registration.first_name);
        let last_name = optional_name(&mut errors, "lastName", registration.last_name);

        let email = match (email, errors.is_empty()) {
            (Some(email), true) => email,
            _ => return Err(AuthError::Validation(errors)),
        };

        let password_hash = hash_password(registration.password)?;

        let user = self
            .users
            .create(&NewUser {
                email,
                password_hash,
                first_name,
                last_name,
                role: Role::Customer,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::Validation(ValidationErrors::single(
                    "email",
                    "an account with this email already exists",
                )),
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");

        let token = self.tokens.issue(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Log in with email and password.
    ///
    /// Unknown emails and wrong passwords fail the same way and both pay for
    /// an Argon2 verification.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email or password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = Email::parse(email.trim())
            .map_err(|_| AuthError::InvalidCredentials)?
            .normalized();

        let Some((mut user, password_hash)) = self.users.get_password_hash(&email).await? else {
            return Err(reject_unknown_account(password));
        };

        verify_password(password, &password_hash)?;

        user.last_login_at = Some(self.users.record_login(user.id).await?);

        let token = self.tokens.issue(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Look up the profile behind a validated token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account was deleted.
    pub async fn current_user(&self, id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

// =============================================================================
// Password Policy & Hashing
// =============================================================================

/// Messages for every password rule `password` breaks.
#[must_use]
pub fn password_policy_violations(password: &str) -> Vec<String> {
    let mut violations = Vec::new();

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        violations.push(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    if length > MAX_PASSWORD_LENGTH {
        violations.push(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        violations.push("password must contain an uppercase letter".to_owned());
    }
    if !password.chars().any(char::is_lowercase) {
        violations.push("password must contain a lowercase letter".to_owned());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("password must contain a digit".to_owned());
    }
    if password.chars().all(char::is_alphanumeric) {
        violations.push("password must contain a non-alphanumeric character".to_owned());
    }

    violations
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Run a throwaway verification and fail with `InvalidCredentials`.
fn reject_unknown_account(password: &str) -> AuthError {
    if let Some(hash) = UNKNOWN_ACCOUNT_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    AuthError::InvalidCredentials
}

fn optional_name(errors: &mut ValidationErrors, field: &str, value: Option<&str>) -> Option<String> {
    let name = value.map(str::trim).filter(|v| !v.is_empty())?;
    if name.chars().count() > MAX_NAME_LENGTH {
        errors.add(field, format!("{field} must be at most {MAX_NAME_LENGTH} characters"));
    }
    Some(name.to_owned())
}
