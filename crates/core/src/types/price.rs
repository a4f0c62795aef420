//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront sells in a single currency (USD); prices are kept as
//! [`Decimal`] so totals never accumulate floating point error.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative unit price in US dollars.
///
/// ```
/// use rust_decimal::Decimal;
/// use satchel_core::Price;
///
/// let price = Price::new(Decimal::new(12_999, 2)).unwrap();
/// assert_eq!(price.to_string(), "$129.99");
/// assert_eq!(price.times(3), Decimal::new(38_997, 2));
///
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Extended price for `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_allowed() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_negative_is_rejected() {
        let err = Price::new(Decimal::new(-500, 2)).unwrap_err();
        assert_eq!(err, PriceError::Negative(Decimal::new(-500, 2)));
    }

    #[test]
    fn test_display_has_two_decimals() {
        assert_eq!(Price::from_cents(4500).to_string(), "$45.00");
        assert_eq!(Price::new(Decimal::from(120)).unwrap().to_string(), "$120.00");
    }

    #[test]
    fn test_deserialize_from_string_and_number() {
        let from_str: Price = serde_json::from_str("\"89.50\"").unwrap();
        assert_eq!(from_str, Price::from_cents(8950));

        let from_int: Price = serde_json::from_str("25").unwrap();
        assert_eq!(from_int.amount(), Decimal::from(25));

        assert!(serde_json::from_str::<Price>("\"-3.00\"").is_err());
    }
}
