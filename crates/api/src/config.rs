//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `JWT_SECRET` - HMAC signing key for bearer tokens (min 32 chars, high entropy)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `API_PORT` - Listen port (default: 8080)
//! - `JWT_ISSUER` - Token issuer (default: storehouse-api)
//! - `JWT_AUDIENCE` - Token audience (default: storehouse-client)
//! - `JWT_EXPIRY_MINUTES` - Token lifetime in minutes (default: 60)
//! - `CORS_ALLOWED_ORIGINS` - Comma separated SPA origins (default: <http://localhost:4200>)
//! - `RATE_LIMIT_ENABLED` - Rate limit `/api/auth` endpoints (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const MAX_JWT_EXPIRY_MINUTES: i64 = 60 * 24 * 7;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token settings
    pub jwt: JwtConfig,
    /// Origins allowed to call the API from a browser
    pub cors_allowed_origins: Vec<String>,
    /// Whether `/api/auth` endpoints are rate limited
    pub rate_limit_enabled: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

/// JWT issuance and validation settings.
///
/// Implements `Debug` manually to redact the signing key.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 signing key
    pub secret: SecretString,
    /// `iss` claim written and required
    pub issuer: String,
    /// `aud` claim written and required
    pub audience: String,
    /// Token lifetime
    pub expiry_minutes: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry_minutes", &self.expiry_minutes)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("API_DATABASE_URL")?;
        let host = get_env_or_default("API_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_PORT".to_string(), e.to_string()))?;

        let jwt = JwtConfig::from_env()?;
        let cors_allowed_origins =
            parse_origins(&get_env_or_default("CORS_ALLOWED_ORIGINS", "http://localhost:4200"));
        let rate_limit_enabled = parse_bool(
            "RATE_LIMIT_ENABLED",
            &get_env_or_default("RATE_LIMIT_ENABLED", "true"),
        )?;

        Ok(Self {
            database_url,
            host,
            port,
            jwt,
            cors_allowed_origins,
            rate_limit_enabled,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = get_required_env("JWT_SECRET")?;
        validate_signing_key("JWT_SECRET", &secret)?;

        let expiry_minutes = get_env_or_default("JWT_EXPIRY_MINUTES", "60")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("JWT_EXPIRY_MINUTES".to_string(), e.to_string())
            })?;
        validate_expiry(expiry_minutes)?;

        Ok(Self {
            secret: SecretString::from(secret),
            issuer: get_env_or_default("JWT_ISSUER", "storehouse-api"),
            audience: get_env_or_default("JWT_AUDIENCE", "storehouse-client"),
            expiry_minutes,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// `primary_key`, then the generic `DATABASE_URL` shared with `sh-cli`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Split a comma separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

fn validate_expiry(minutes: i64) -> Result<(), ConfigError> {
    if !(1..=MAX_JWT_EXPIRY_MINUTES).contains(&minutes) {
        return Err(ConfigError::InvalidEnvVar(
            "JWT_EXPIRY_MINUTES".to_string(),
            format!("must be between 1 and {MAX_JWT_EXPIRY_MINUTES}"),
        ));
    }
    Ok(())
}

/// Reject short keys, copied placeholders, and low-entropy keys.
fn validate_signing_key(var_name: &str, key: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| Err(ConfigError::InsecureSecret(var_name.to_string(), reason));

    let length = key.chars().count();
    if length < MIN_JWT_SECRET_LENGTH {
        return insecure(format!(
            "must be at least {MIN_JWT_SECRET_LENGTH} characters (got {length})"
        ));
    }

    let lower = key.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return insecure(format!("appears to be a placeholder (contains '{pattern}')"));
    }

    let entropy = shannon_entropy(key);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated key."
        ));
    }

    Ok(())
}

/// Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut freq: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *freq.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    freq.values()
        .map(|&count| {
            let p = f64::from(count) / total;
            -p * p.log2()
        })
        .sum()
}
