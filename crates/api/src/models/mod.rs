//! Domain models for the catalog API.
//!
//! These types represent validated domain objects, separate from database
//! row types (in `db`) and wire contracts (in `dto`).

pub mod category;
pub mod dashboard;
pub mod pagination;
pub mod product;
pub mod user;

pub use category::{Category, CategorySummary};
pub use dashboard::{DashboardSummary, DashboardTotals, PriceStats};
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest};
pub use product::{NewProduct, Product, ProductChanges, ProductFilter, ProductImage};
pub use user::{AuthenticatedUser, NewUser, User};
