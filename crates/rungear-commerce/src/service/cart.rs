use crate::cart::{Cart, PromoOutcome};
use crate::context::{AppliedPromo, ShopContext};
use crate::dates::Clock;
use crate::error::CommerceError;
use crate::gateway::ShopGateway;
use crate::ids::{CartItemId, ProductId};
use crate::service::member_cart_count;
use std::sync::Arc;

/// Direction value that increments a line; anything else decrements.
pub const INCREASE: &str = "increase";

/// Cart line management and promo application.
#[derive(Clone)]
pub struct CartService {
    gateway: Arc<dyn ShopGateway>,
    clock: Arc<dyn Clock>,
}

impl CartService {
    pub fn new(gateway: Arc<dyn ShopGateway>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }

    /// Add `quantity` of a product to the member's cart.
    pub async fn add_item(
        &self,
        ctx: &ShopContext,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        self.gateway
            .add_to_cart(ctx.member_id, product_id, quantity)
            .await?;
        tracing::info!(member = %ctx.member_id, product = %product_id, quantity, "item added to cart");
        Ok(())
    }

    /// Delete a cart line.
    pub async fn remove_item(&self, cart_item_id: CartItemId) -> Result<(), CommerceError> {
        self.gateway.remove_from_cart(cart_item_id).await?;
        tracing::info!(line = %cart_item_id, "cart line removed");
        Ok(())
    }

    /// Step a line's quantity up for `"increase"`, down for anything else.
    pub async fn update_quantity(
        &self,
        cart_item_id: CartItemId,
        direction: &str,
    ) -> Result<(), CommerceError> {
        let change = if direction == INCREASE { 1 } else { -1 };
        self.gateway.update_cart_qty(cart_item_id, change).await?;
        tracing::debug!(line = %cart_item_id, change, "cart quantity updated");
        Ok(())
    }

    /// Validate `code` and, when it is worth something, store it in `ctx`.
    ///
    /// An invalid code leaves `ctx` untouched, including any promo already
    /// applied.
    pub async fn apply_promo(
        &self,
        ctx: &mut ShopContext,
        code: &str,
    ) -> Result<PromoOutcome, CommerceError> {
        let amount = self.gateway.validate_promo(code).await?;
        match amount {
            Some(discount) if discount.is_positive() => {
                ctx.promo = Some(AppliedPromo {
                    code: code.trim().to_string(),
                    discount,
                });
                tracing::info!(member = %ctx.member_id, code, discount = discount.amount_cents, "promo applied");
                Ok(PromoOutcome::Applied(discount))
            }
            _ => {
                tracing::warn!(member = %ctx.member_id, code, "promo rejected");
                Ok(PromoOutcome::Invalid)
            }
        }
    }

    /// The member's cart with totals and a standard delivery estimate.
    pub async fn get_cart(&self, ctx: &ShopContext) -> Result<Cart, CommerceError> {
        let items = self.gateway.get_cart_by_member(ctx.member_id).await?;
        Cart::build(ctx, items, self.clock.today())
    }

    /// Sum of quantities in the member's cart; zero for guests.
    pub async fn cart_count(&self, ctx: &ShopContext) -> Result<i64, CommerceError> {
        member_cart_count(self.gateway.as_ref(), ctx.member_id).await
    }
}
