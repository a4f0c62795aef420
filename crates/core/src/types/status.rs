//! Status and option enums for orders and checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Statuses shown on the tracking timeline, in order.
    pub const TIMELINE: [Self; 3] = [Self::Processing, Self::Shipped, Self::Delivered];

    /// Position on the tracking timeline, or `None` for cancelled orders.
    #[must_use]
    pub fn timeline_position(self) -> Option<usize> {
        Self::TIMELINE.iter().position(|status| *status == self)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "Processing"),
            Self::Shipped => write!(f, "Shipped"),
            Self::Delivered => write!(f, "Delivered"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Shipping speed chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryOption {
    #[default]
    Standard,
    Express,
}

impl DeliveryOption {
    /// Flat delivery fee in dollars.
    #[must_use]
    pub fn fee(self) -> Decimal {
        match self {
            Self::Standard => Decimal::ZERO,
            Self::Express => Decimal::from(15),
        }
    }
}

/// Payment method selected at checkout.
///
/// Only `Card` requires additional fields; virtual account (`Va`) and QRIS
/// payments are completed outside the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Va,
    Qris,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Card => write!(f, "card"),
            Self::Va => write!(f, "va"),
            Self::Qris => write!(f, "qris"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "va" => Ok(Self::Va),
            "qris" => Ok(Self::Qris),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_position() {
        assert_eq!(OrderStatus::Processing.timeline_position(), Some(0));
        assert_eq!(OrderStatus::Delivered.timeline_position(), Some(2));
        assert_eq!(OrderStatus::Cancelled.timeline_position(), None);
    }

    #[test]
    fn test_delivery_fee() {
        assert_eq!(DeliveryOption::Standard.fee(), Decimal::ZERO);
        assert_eq!(DeliveryOption::Express.fee(), Decimal::from(15));
    }

    #[test]
    fn test_payment_method_serde_is_lowercase() {
        let json = serde_json::to_string(&PaymentMethod::Qris).unwrap();
        assert_eq!(json, "\"qris\"");
        assert_eq!("va".parse::<PaymentMethod>().unwrap(), PaymentMethod::Va);
        assert!("cash".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_order_status_serde_matches_display() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, format!("\"{}\"", OrderStatus::Shipped));
    }
}
