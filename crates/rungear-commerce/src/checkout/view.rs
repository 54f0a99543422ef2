//! Checkout page model and service outcomes.

use crate::cart::{CartItem, CartPricing};
use crate::checkout::{CheckoutForm, FieldErrors, OrderConfirmation};
use serde::{Deserialize, Serialize};

/// The checkout page: cart lines, totals, the form and any messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub items: Vec<CartItem>,
    #[serde(flatten)]
    pub pricing: CartPricing,
    pub form: CheckoutForm,
    pub errors: FieldErrors,
}

/// Result of opening the checkout page.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Nothing to check out.
    EmptyCart,
    Ready(CheckoutView),
}

/// Result of submitting the checkout form.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceOrderOutcome {
    /// The cart emptied before submission; nothing was placed.
    EmptyCart,
    /// The form was rejected; redisplay it.
    Invalid(CheckoutView),
    /// The order was recorded.
    Placed(OrderConfirmation),
}
