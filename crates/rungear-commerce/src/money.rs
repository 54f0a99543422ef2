//! Money type for representing monetary values.
//!
//! Uses an integer count of minor units (centavos for PHP) so totals never
//! pick up floating-point drift.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies. The shop prices everything in pesos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    PHP,
}

impl Currency {
    /// Get the currency code (e.g., "PHP").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::PHP => "PHP",
        }
    }

    /// Get the currency symbol (e.g., "₱").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::PHP => "\u{20b1}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::PHP => 2,
        }
    }

    fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., centavos).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a PHP amount from minor units.
    pub fn php(amount_cents: i64) -> Self {
        Self::new(amount_cents, Currency::PHP)
    }

    /// Create a value from whole major units (e.g. `150` pesos).
    pub fn from_major(amount: i64, currency: Currency) -> Self {
        Self::new(amount.saturating_mul(currency.minor_per_major()), currency)
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use rungear_commerce::money::{Money, Currency};
    /// let price = Money::from_decimal(4999.50, Currency::PHP);
    /// assert_eq!(price.amount_cents, 499_950);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let amount_cents = (amount * currency.minor_per_major() as f64).round() as i64;
        Self::new(amount_cents, currency)
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Format with symbol, thousands separators and full precision
    /// (e.g. "₱12,999.50").
    pub fn display(&self) -> String {
        let per = self.currency.minor_per_major();
        let places = self.currency.decimal_places() as usize;
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.amount_cents.unsigned_abs();
        let major = group_thousands(abs / per as u64);
        let minor = abs % per as u64;
        format!(
            "{}{}{}.{:0places$}",
            sign,
            self.currency.symbol(),
            major,
            minor
        )
    }

    /// Format rounded to whole units (e.g. "₱1,500").
    ///
    /// Halves round away from zero.
    pub fn display_whole(&self) -> String {
        let per = self.currency.minor_per_major() as u64;
        let abs = self.amount_cents.unsigned_abs();
        let whole = (abs + per / 2) / per;
        let sign = if self.is_negative() && whole > 0 { "-" } else { "" };
        format!("{}{}{}", sign, self.currency.symbol(), group_thousands(whole))
    }

    /// Add another Money value, checking overflow.
    pub fn try_add(&self, other: &Money) -> Result<Money, CommerceError> {
        let sum = self
            .amount_cents
            .checked_add(other.amount_cents)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(sum, self.currency))
    }

    /// Subtract another Money value, checking overflow.
    pub fn try_subtract(&self, other: &Money) -> Result<Money, CommerceError> {
        let diff = self
            .amount_cents
            .checked_sub(other.amount_cents)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(diff, self.currency))
    }

    /// Multiply by a quantity.
    pub fn try_multiply(&self, factor: i64) -> Result<Money, CommerceError> {
        let product = self
            .amount_cents
            .checked_mul(factor)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(product, self.currency))
    }

    /// Sum an iterator of Money values.
    pub fn try_sum<'a>(
        iter: impl IntoIterator<Item = &'a Money>,
        currency: Currency,
    ) -> Result<Money, CommerceError> {
        iter.into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_major() {
        let m = Money::from_major(150, Currency::PHP);
        assert_eq!(m.amount_cents, 15_000);
    }

    #[test]
    fn test_money_from_decimal() {
        let m = Money::from_decimal(49.99, Currency::PHP);
        assert_eq!(m.amount_cents, 4999);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::php(1_299_950).display(), "\u{20b1}12,999.50");
        assert_eq!(Money::php(5).display(), "\u{20b1}0.05");
        assert_eq!(Money::php(-15_000).display(), "-\u{20b1}150.00");
    }

    #[test]
    fn test_money_display_whole() {
        assert_eq!(Money::php(150_000).display_whole(), "\u{20b1}1,500");
        assert_eq!(Money::php(50).display_whole(), "\u{20b1}1");
        assert_eq!(Money::php(49).display_whole(), "\u{20b1}0");
        assert_eq!(Money::php(123_456_789_00).display_whole(), "\u{20b1}123,456,789");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::php(1000);
        let b = Money::php(300);
        assert_eq!(a.try_add(&b).unwrap().amount_cents, 1300);
        assert_eq!(a.try_subtract(&b).unwrap().amount_cents, 700);
        assert_eq!(a.try_multiply(3).unwrap().amount_cents, 3000);
    }

    #[test]
    fn test_money_sum() {
        let amounts = [Money::php(100), Money::php(250), Money::php(50)];
        let total = Money::try_sum(&amounts, Currency::PHP).unwrap();
        assert_eq!(total.amount_cents, 400);
        assert!(Money::try_sum(&[], Currency::PHP).unwrap().is_zero());
    }

    #[test]
    fn test_money_overflow() {
        let max = Money::php(i64::MAX);
        assert!(matches!(
            max.try_add(&Money::php(1)),
            Err(CommerceError::Overflow)
        ));
        assert!(matches!(max.try_multiply(2), Err(CommerceError::Overflow)));
    }

    #[test]
    fn test_money_serializes_camel_case() {
        let json = serde_json::to_value(Money::php(264_000)).unwrap();
        assert_eq!(json, serde_json::json!({"amountCents": 264_000, "currency": "PHP"}));
        let back: Money = serde_json::from_value(json).unwrap();
        assert_eq!(back, Money::php(264_000));
    }
}
