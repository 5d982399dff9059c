//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount does not fit the `NUMERIC(12,2)` column.
    #[error("price must be less than {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
}

/// A non-negative product price with two fractional digits.
///
/// Amounts are rounded half away from zero, so `9.995` becomes `10.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Number of fractional digits stored.
    pub const SCALE: u32 = 2;

    /// Exclusive upper bound imposed by the `NUMERIC(12,2)` column.
    pub const MAX: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price, rounding to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for amounts below zero and
    /// `PriceError::TooLarge` for amounts that do not fit the column.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        let rounded =
            amount.round_dp_with_strategy(Self::SCALE, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_zero() {
            return Ok(Self::ZERO);
        }
        if rounded.is_sign_negative() {
            return Err(PriceError::Negative);
        }
        if rounded >= Self::MAX {
            return Err(PriceError::TooLarge { max: Self::MAX });
        }
        Ok(Self(rounded))
    }

    /// Create a price from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `cents` is negative.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, Self::SCALE))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Column constraints already guarantee a valid price
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_rounds_to_two_places() {
        assert_eq!(Price::new(dec("19.999")).unwrap().amount(), dec("20.00"));
        assert_eq!(Price::new(dec("9.995")).unwrap().amount(), dec("10.00"));
        assert_eq!(Price::new(dec("1.234")).unwrap().amount(), dec("1.23"));
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(Price::new(dec("-0.01")), Err(PriceError::Negative));
        assert!(Price::new(dec("-0.001")).is_ok());
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_rejects_too_large() {
        assert_eq!(Price::MAX, dec("10000000000"));
        assert!(Price::new(dec("9999999999.99")).is_ok());
        assert!(matches!(
            Price::new(dec("10000000000")),
            Err(PriceError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(1999).unwrap().to_string(), "19.99");
    }

    #[test]
    fn test_deserialize_validates() {
        let price: Price = serde_json::from_str("12.5").unwrap();
        assert_eq!(price.to_string(), "12.50");
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }
}
