//! Orders: the placement request and the confirmation snapshot.

use crate::cart::{CartItem, CartPricing};
use crate::checkout::{DeliveryOption, PaymentMethod};
use crate::ids::{MemberId, OrderId, ProductId};
use crate::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status. Orders only ever reach `Placed` here;
/// fulfilment happens outside the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Placed,
}

/// Everything the store needs to record an order.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub member_id: MemberId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub delivery_option: DeliveryOption,
    pub payment_method: PaymentMethod,
    pub card_number: String,
    pub card_expiry: String,
    pub card_cvv: String,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub discount: Money,
    pub total: Money,
}

impl NewOrder {
    /// Card number reduced to its last four digits, e.g. `****1111`.
    pub fn masked_card(&self) -> Option<String> {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if digits.is_empty() {
            return None;
        }
        let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        Some(format!("****{}", tail))
    }
}

impl fmt::Debug for NewOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewOrder")
            .field("member_id", &self.member_id)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("delivery_option", &self.delivery_option)
            .field("payment_method", &self.payment_method)
            .field("card", &self.masked_card())
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

/// One line of a placed order, copied from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub image_url: String,
    pub size: String,
    pub color: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            image_url: item.image_url.clone(),
            size: item.size.clone(),
            color: item.color.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

/// Snapshot shown once after a successful order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub delivery_option: DeliveryOption,
    pub payment_method: PaymentMethod,
    pub estimated_delivery: NaiveDate,
    pub items: Vec<OrderItem>,
    #[serde(flatten)]
    pub pricing: CartPricing,
}

impl OrderConfirmation {
    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}
