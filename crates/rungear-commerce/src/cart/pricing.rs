//! Cart pricing calculations.

use crate::cart::CartItem;
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Pricing breakdown shared by the cart, checkout and confirmation views.
///
/// `total` is always `subtotal + shipping_fee - discount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPricing {
    /// Sum of unit price times quantity over every line.
    pub subtotal: Money,
    /// Shipping charge; zero for an empty cart.
    pub shipping_fee: Money,
    /// Promo discount.
    pub discount: Money,
    /// Amount due.
    pub total: Money,
}

impl CartPricing {
    /// Price `items` with the given shipping rate and discount.
    ///
    /// The shipping rate applies only when there is at least one line.
    pub fn calculate(
        items: &[CartItem],
        shipping_rate: Money,
        discount: Money,
    ) -> Result<Self, CommerceError> {
        let currency = shipping_rate.currency;
        let subtotal = subtotal(items, currency)?;
        let shipping_fee = if items.is_empty() {
            Money::zero(currency)
        } else {
            shipping_rate
        };
        let total = subtotal.try_add(&shipping_fee)?.try_subtract(&discount)?;
        Ok(Self {
            subtotal,
            shipping_fee,
            discount,
            total,
        })
    }

    /// Whether a promo discount is applied.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }
}

/// Sum of line totals.
pub fn subtotal(items: &[CartItem], currency: Currency) -> Result<Money, CommerceError> {
    items.iter().try_fold(Money::zero(currency), |acc, item| {
        acc.try_add(&item.line_total()?)
    })
}
