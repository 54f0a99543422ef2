//! The data-store contract behind the storefront.
//!
//! Every method is one remote call. Totals, validation and date math stay
//! in-process; the gateway only stores and retrieves.

mod memory;
mod seed;
#[cfg(feature = "storage")]
mod sqlite;

pub use memory::{MemoryGateway, StoredOrder};
pub use seed::{demo_products, demo_promos};
#[cfg(feature = "storage")]
pub use sqlite::SqliteGateway;

use crate::cart::CartItem;
use crate::catalog::{Product, ProductQuery};
use crate::checkout::NewOrder;
use crate::error::CommerceError;
use crate::ids::{CartItemId, MemberId, OrderId, ProductId};
use crate::money::Money;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY_PER_ITEM: i64 = 99;

/// Stored-procedure style access to products, carts, promos and orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShopGateway: Send + Sync {
    /// Products matching the query, in the requested order.
    async fn get_products(&self, query: ProductQuery) -> Result<Vec<Product>, CommerceError>;

    /// Add `quantity` of a product to the member's cart, merging with an
    /// existing line for the same product.
    async fn add_to_cart(
        &self,
        member_id: MemberId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), CommerceError>;

    /// Lines in the member's cart.
    async fn get_cart_by_member(&self, member_id: MemberId) -> Result<Vec<CartItem>, CommerceError>;

    /// Delete a cart line. Unknown lines are ignored.
    async fn remove_from_cart(&self, cart_item_id: CartItemId) -> Result<(), CommerceError>;

    /// Change a line's quantity by `change`, keeping it within
    /// `1..=MAX_QUANTITY_PER_ITEM` per the gateway's [`QuantityFloor`].
    async fn update_cart_qty(&self, cart_item_id: CartItemId, change: i64)
        -> Result<(), CommerceError>;

    /// Discount a promo code is worth, `None` when the store has no value.
    async fn validate_promo(&self, code: &str) -> Result<Option<Money>, CommerceError>;

    /// Record an order, empty the member's cart and return the order number.
    async fn place_order(&self, order: NewOrder) -> Result<OrderId, CommerceError>;
}

/// What happens when a decrement would take a line below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuantityFloor {
    /// Delete the line.
    #[default]
    RemoveLine,
    /// Leave the line at one.
    ClampAtOne,
}

/// Where a quantity change lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuantityChange {
    Set(i64),
    Remove,
}

impl QuantityFloor {
    /// Apply `change` to `current` under this policy and the line ceiling.
    pub(crate) fn apply(self, current: i64, change: i64) -> QuantityChange {
        let target = current.saturating_add(change);
        if target < 1 {
            return match self {
                QuantityFloor::RemoveLine => QuantityChange::Remove,
                QuantityFloor::ClampAtOne => QuantityChange::Set(1),
            };
        }
        QuantityChange::Set(target.min(MAX_QUANTITY_PER_ITEM))
    }
}

/// Order number in the `RG-<year>-<6 digits>` format.
pub(crate) fn format_order_id(year: i32, sequence: i64) -> OrderId {
    OrderId::new(format!("RG-{}-{:06}", year, sequence))
}
