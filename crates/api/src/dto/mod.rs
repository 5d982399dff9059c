//! Wire contracts for the REST API.
//!
//! Request types validate themselves into domain inputs; response types are
//! built from domain models. All JSON fields are camelCase.

use std::num::IntErrorKind;

pub mod auth;
pub mod category;
pub mod dashboard;
pub mod pagination;
pub mod product;

pub use auth::{AuthResponse, LoginRequest, RegisterRequest, UserDto};
pub use category::{CategoryDto, CategoryRequest};
pub use dashboard::{ChangeRoleRequest, DashboardDto, UserListParams};
pub use pagination::PagedResponse;
pub use product::{
    AddImageRequest, CreateProductRequest, ProductDto, ProductImageDto, ProductQueryParams,
    UpdateProductRequest,
};

/// Parse an optional numeric query value, treating blanks and junk as absent.
///
/// Values outside the `i64` range saturate.
pub(crate) fn lenient_i64(raw: Option<&str>) -> Option<i64> {
    match raw?.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_i64() {
        assert_eq!(lenient_i64(Some(" 3 ")), Some(3));
        assert_eq!(lenient_i64(Some("-2")), Some(-2));
        assert_eq!(lenient_i64(Some("abc")), None);
        assert_eq!(lenient_i64(Some("")), None);
        assert_eq!(lenient_i64(None), None);
    }

    #[test]
    fn test_lenient_i64_saturates_out_of_range() {
        assert_eq!(lenient_i64(Some("99999999999999999999")), Some(i64::MAX));
        assert_eq!(lenient_i64(Some("-99999999999999999999")), Some(i64::MIN));
    }
}
