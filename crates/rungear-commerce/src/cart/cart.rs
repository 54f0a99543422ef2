//! Cart and line item types.

use crate::cart::CartPricing;
use crate::checkout::DeliveryOption;
use crate::context::ShopContext;
use crate::dates::{add_business_days, STANDARD_DELIVERY_DAYS};
use crate::error::CommerceError;
use crate::ids::{CartItemId, MemberId, ProductId};
use crate::money::{Currency, Money};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One line of a member's cart, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line identifier.
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub image_url: String,
    /// Chosen size; empty when none.
    pub size: String,
    /// Chosen colour; empty when none.
    pub color: String,
    pub unit_price: Money,
    /// Always at least 1.
    pub quantity: i64,
    pub in_stock: bool,
}

impl CartItem {
    /// Unit price times quantity.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price.try_multiply(self.quantity)
    }
}

/// The cart page: lines plus totals for standard shipping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub member_id: MemberId,
    pub items: Vec<CartItem>,
    #[serde(flatten)]
    pub pricing: CartPricing,
    /// Promo code currently applied.
    pub promo_code: Option<String>,
    /// Standard-shipping arrival estimate.
    pub estimated_delivery: NaiveDate,
}

impl Cart {
    /// Assemble the cart view for `ctx` from stored lines.
    pub fn build(
        ctx: &ShopContext,
        items: Vec<CartItem>,
        today: NaiveDate,
    ) -> Result<Self, CommerceError> {
        let pricing = CartPricing::calculate(
            &items,
            DeliveryOption::Standard.fee(),
            ctx.discount(Currency::PHP),
        )?;
        Ok(Self {
            member_id: ctx.member_id,
            items,
            pricing,
            promo_code: ctx.promo_code().map(str::to_string),
            estimated_delivery: add_business_days(today, STANDARD_DELIVERY_DAYS),
        })
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        item_count(&self.items)
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Sum of quantities.
pub fn item_count(items: &[CartItem]) -> i64 {
    items.iter().map(|i| i.quantity).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AppliedPromo;

    fn line(id: i64, unit_cents: i64, quantity: i64) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            product_id: ProductId::new(100 + id),
            product_name: "Ultraboost Light".into(),
            image_url: "/img/ultraboost.jpg".into(),
            size: "9".into(),
            color: String::new(),
            unit_price: Money::php(unit_cents),
            quantity,
            in_stock: true,
        }
    }

    #[test]
    fn test_build_cart_with_promo() {
        let ctx = ShopContext {
            member_id: MemberId::new(5),
            promo: Some(AppliedPromo {
                code: "RUN10".into(),
                discount: Money::php(50_000),
            }),
        };
        // 2024-03-04 is a Monday.
        let today = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let cart = Cart::build(&ctx, vec![line(1, 900_000, 1), line(2, 150_000, 3)], today)
            .unwrap();

        assert_eq!(cart.pricing.subtotal, Money::php(1_350_000));
        assert_eq!(cart.pricing.shipping_fee, Money::php(15_000));
        assert_eq!(cart.pricing.discount, Money::php(50_000));
        assert_eq!(cart.pricing.total, Money::php(1_315_000));
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.promo_code.as_deref(), Some("RUN10"));
        assert_eq!(
            cart.estimated_delivery,
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
    }

    #[test]
    fn test_empty_cart() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let cart = Cart::build(&ShopContext::guest(), Vec::new(), today).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert!(cart.pricing.total.is_zero());
    }
}
