use crate::cart::{CartItem, CartPricing};
use crate::checkout::{
    CheckoutForm, CheckoutOutcome, CheckoutView, DeliveryOption, FieldErrors, NewOrder,
    OrderConfirmation, OrderItem, OrderStatus, PlaceOrderOutcome,
};
use crate::context::ShopContext;
use crate::dates::{add_business_days, Clock};
use crate::error::CommerceError;
use crate::gateway::ShopGateway;
use crate::money::Currency;
use std::sync::Arc;

/// Checkout page and order placement.
#[derive(Clone)]
pub struct CheckoutService {
    gateway: Arc<dyn ShopGateway>,
    clock: Arc<dyn Clock>,
}

impl CheckoutService {
    pub fn new(gateway: Arc<dyn ShopGateway>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }

    /// The checkout page with standard shipping, or `EmptyCart`.
    pub async fn checkout_view(&self, ctx: &ShopContext) -> Result<CheckoutOutcome, CommerceError> {
        let items = self.gateway.get_cart_by_member(ctx.member_id).await?;
        if items.is_empty() {
            return Ok(CheckoutOutcome::EmptyCart);
        }
        let view = build_view(ctx, items, CheckoutForm::default(), FieldErrors::default())?;
        Ok(CheckoutOutcome::Ready(view))
    }

    /// Validate the form against the stored cart and place the order.
    ///
    /// Totals come from the stored cart, never from the client. On success
    /// the promo is cleared from `ctx`.
    pub async fn place_order(
        &self,
        ctx: &mut ShopContext,
        form: CheckoutForm,
    ) -> Result<PlaceOrderOutcome, CommerceError> {
        let items = self.gateway.get_cart_by_member(ctx.member_id).await?;
        if items.is_empty() {
            return Ok(PlaceOrderOutcome::EmptyCart);
        }

        let choices = match form.validate() {
            Ok(choices) => choices,
            Err(errors) => {
                tracing::warn!(
                    member = %ctx.member_id,
                    fields = ?errors.fields().collect::<Vec<_>>(),
                    "checkout rejected"
                );
                let view = build_view(ctx, items, form, errors)?;
                return Ok(PlaceOrderOutcome::Invalid(view));
            }
        };

        let pricing = price(ctx, &items, choices.delivery)?;
        let order = NewOrder {
            member_id: ctx.member_id,
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            address: form.address.trim().to_string(),
            city: form.city.trim().to_string(),
            postal_code: form.postal_code.trim().to_string(),
            delivery_option: choices.delivery,
            payment_method: choices.payment,
            card_number: form.card_number.trim().to_string(),
            card_expiry: form.card_expiry.trim().to_string(),
            card_cvv: form.card_cvv.trim().to_string(),
            subtotal: pricing.subtotal,
            shipping_fee: pricing.shipping_fee,
            discount: pricing.discount,
            total: pricing.total,
        };
        let order_id = self.gateway.place_order(order.clone()).await?;
        ctx.clear_promo();
        tracing::info!(
            member = %ctx.member_id,
            order = %order_id,
            total = pricing.total.amount_cents,
            "order placed"
        );

        Ok(PlaceOrderOutcome::Placed(OrderConfirmation {
            order_id,
            status: OrderStatus::Placed,
            full_name: order.full_name,
            email: order.email,
            phone: order.phone,
            address: order.address,
            city: order.city,
            postal_code: order.postal_code,
            delivery_option: choices.delivery,
            payment_method: choices.payment,
            estimated_delivery: add_business_days(
                self.clock.today(),
                choices.delivery.delivery_days(),
            ),
            items: items.iter().map(OrderItem::from).collect(),
            pricing,
        }))
    }
}

fn price(
    ctx: &ShopContext,
    items: &[CartItem],
    delivery: DeliveryOption,
) -> Result<CartPricing, CommerceError> {
    CartPricing::calculate(items, delivery.fee(), ctx.discount(Currency::PHP))
}

fn build_view(
    ctx: &ShopContext,
    items: Vec<CartItem>,
    form: CheckoutForm,
    errors: FieldErrors,
) -> Result<CheckoutView, CommerceError> {
    // Unrecognised options are priced as standard.
    let delivery = form.delivery().unwrap_or_default();
    let pricing = price(ctx, &items, delivery)?;
    Ok(CheckoutView {
        items,
        pricing,
        form,
        errors,
    })
}
