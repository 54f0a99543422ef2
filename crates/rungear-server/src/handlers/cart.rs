//! Cart page and cart form posts.

use axum::extract::State;
use axum::response::{Redirect, Response};
use axum::Form;
use rungear_commerce::ids::{CartItemId, ProductId};
use serde::Deserialize;

use crate::error::AppError;
use crate::session::CurrentSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddToCartForm {
    product_id: i64,
    #[serde(default = "one")]
    quantity: i64,
    csrf_token: Option<String>,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartLineForm {
    cart_item_id: i64,
    /// `increase` or `decrease`; only used by quantity updates.
    #[serde(default)]
    action: String,
    csrf_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromoForm {
    #[serde(default)]
    promo_code: String,
    csrf_token: Option<String>,
}

/// `GET /shop/cart`.
pub(crate) async fn view_cart(
    State(state): State<AppState>,
    mut session: CurrentSession,
) -> Result<Response, AppError> {
    let ctx = session.data.context();
    let cart = state.carts.get_cart(&ctx).await?;
    let view = session.render(&state, cart);
    session.commit(&state, view)
}

/// `POST /shop/cart/add`.
pub(crate) async fn add_to_cart(
    State(state): State<AppState>,
    mut session: CurrentSession,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    session.verify_csrf(&state, form.csrf_token.as_deref())?;
    let ctx = session.data.context();
    state
        .carts
        .add_item(&ctx, ProductId::new(form.product_id), form.quantity)
        .await?;
    session.data.flash_success("Item added to cart!");
    session.commit(&state, Redirect::to("/shop"))
}

/// `POST /shop/cart/remove`.
pub(crate) async fn remove_from_cart(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<CartLineForm>,
) -> Result<Response, AppError> {
    session.verify_csrf(&state, form.csrf_token.as_deref())?;
    state
        .carts
        .remove_item(CartItemId::new(form.cart_item_id))
        .await?;
    session.commit(&state, Redirect::to("/shop/cart"))
}

/// `POST /shop/cart/update-qty`.
pub(crate) async fn update_quantity(
    State(state): State<AppState>,
    session: CurrentSession,
    Form(form): Form<CartLineForm>,
) -> Result<Response, AppError> {
    session.verify_csrf(&state, form.csrf_token.as_deref())?;
    state
        .carts
        .update_quantity(CartItemId::new(form.cart_item_id), &form.action)
        .await?;
    session.commit(&state, Redirect::to("/shop/cart"))
}

/// `POST /shop/cart/promo`.
pub(crate) async fn apply_promo(
    State(state): State<AppState>,
    mut session: CurrentSession,
    Form(form): Form<PromoForm>,
) -> Result<Response, AppError> {
    session.verify_csrf(&state, form.csrf_token.as_deref())?;
    let mut ctx = session.data.context();
    let outcome = state.carts.apply_promo(&mut ctx, &form.promo_code).await?;
    if outcome.is_applied() {
        session.data.flash_success(outcome.message());
    } else {
        session.data.flash_error(outcome.message());
    }
    session.data.absorb(&ctx);
    session.commit(&state, Redirect::to("/shop/cart"))
}
