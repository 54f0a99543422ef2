//! Delivery and payment choices.

use crate::dates::{EXPRESS_DELIVERY_DAYS, STANDARD_DELIVERY_DAYS};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryOption {
    #[default]
    Standard,
    Express,
}

impl DeliveryOption {
    /// Shipping charge for a non-empty order.
    pub fn fee(&self) -> Money {
        match self {
            DeliveryOption::Standard => Money::from_major(150, Currency::PHP),
            DeliveryOption::Express => Money::from_major(300, Currency::PHP),
        }
    }

    /// Business days until arrival.
    pub fn delivery_days(&self) -> u32 {
        match self {
            DeliveryOption::Standard => STANDARD_DELIVERY_DAYS,
            DeliveryOption::Express => EXPRESS_DELIVERY_DAYS,
        }
    }

    /// Form value of the option.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOption::Standard => "Standard",
            DeliveryOption::Express => "Express",
        }
    }

    /// Parse a form value, ignoring case and surrounding blanks.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(DeliveryOption::Standard),
            "express" => Some(DeliveryOption::Express),
            _ => None,
        }
    }
}

impl fmt::Display for DeliveryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    Card,
    PayPal,
    #[serde(rename = "COD")]
    Cod,
}

impl PaymentMethod {
    /// Form value of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::Cod => "COD",
        }
    }

    /// Parse a form value, ignoring case and surrounding blanks.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Some(PaymentMethod::Card),
            "paypal" => Some(PaymentMethod::PayPal),
            "cod" => Some(PaymentMethod::Cod),
            _ => None,
        }
    }

    /// Whether card details must be supplied.
    pub fn requires_card(&self) -> bool {
        matches!(self, PaymentMethod::Card)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fees() {
        assert_eq!(DeliveryOption::Standard.fee(), Money::php(15_000));
        assert_eq!(DeliveryOption::Express.fee(), Money::php(30_000));
    }

    #[test]
    fn test_parse() {
        assert_eq!(DeliveryOption::parse(" express "), Some(DeliveryOption::Express));
        assert_eq!(DeliveryOption::parse("Overnight"), None);
        assert_eq!(PaymentMethod::parse("PayPal"), Some(PaymentMethod::PayPal));
        assert_eq!(PaymentMethod::parse("cod"), Some(PaymentMethod::Cod));
        assert_eq!(PaymentMethod::parse(""), None);
    }
}
