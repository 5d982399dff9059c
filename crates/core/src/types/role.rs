//! User roles used for authorization.

use serde::{Deserialize, Serialize};

/// Error returned when a role name is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected Admin or Customer)")]
pub struct RoleParseError(String);

/// Role of a user account.
///
/// Serialized as `"Admin"` / `"Customer"` on the wire and in token claims,
/// stored as the `shop.user_role` enum (`admin`, `customer`) in `PostgreSQL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.user_role", rename_all = "snake_case")
)]
pub enum Role {
    /// Manages the catalog and other users.
    Admin,
    /// Regular shopper account.
    #[default]
    Customer,
}

impl Role {
    /// Role name as it appears in token claims.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Customer => "Customer",
        }
    }

    /// Whether this role may manage the catalog.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_any_case() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("CUSTOMER".parse::<Role>().unwrap(), Role::Customer);
        assert!("super_admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_claim_names() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"Admin\"");
        let role: Role = serde_json::from_str("\"Customer\"").unwrap();
        assert_eq!(role, Role::Customer);
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(Role::Admin.to_string(), Role::Admin.as_str());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Customer.is_admin());
    }
}
