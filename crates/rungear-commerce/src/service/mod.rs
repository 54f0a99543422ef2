//! Storefront services: catalog query, cart and checkout.
//!
//! Services hold a shared [`ShopGateway`] and take the shopper's
//! [`ShopContext`](crate::context::ShopContext) explicitly on every call.

mod cart;
mod catalog;
mod checkout;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;

use crate::cart::item_count;
use crate::error::CommerceError;
use crate::gateway::ShopGateway;
use crate::ids::MemberId;

/// Items in a member's cart; guests always have none.
async fn member_cart_count(
    gateway: &dyn ShopGateway,
    member_id: MemberId,
) -> Result<i64, CommerceError> {
    if member_id.is_guest() {
        return Ok(0);
    }
    let items = gateway.get_cart_by_member(member_id).await?;
    Ok(item_count(&items))
}
