//! Business logic services.
//!
//! Services sit between route handlers and repositories. They enforce the
//! rules that span more than one table and translate repository errors into
//! errors a handler can map to a status code.

pub mod auth;
pub mod catalog;
pub mod dashboard;

pub use auth::{AuthError, AuthService, AuthSession, TokenError, TokenService};
pub use catalog::{CatalogError, CatalogService};
pub use dashboard::{DashboardError, DashboardService};
