//! Checkout form, order placement types and outcomes.

mod form;
mod order;
mod shipping;
mod view;

pub use form::{CheckoutChoices, CheckoutForm, FieldErrors};
pub use order::{NewOrder, OrderConfirmation, OrderItem, OrderStatus};
pub use shipping::{DeliveryOption, PaymentMethod};
pub use view::{CheckoutOutcome, CheckoutView, PlaceOrderOutcome};
