//! Shopping cart types.

#[allow(clippy::module_inception)]
mod cart;
mod pricing;
mod promo;

pub use cart::{item_count, Cart, CartItem};
pub use pricing::{subtotal, CartPricing};
pub use promo::PromoOutcome;
