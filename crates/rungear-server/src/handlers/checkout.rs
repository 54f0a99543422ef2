//! Checkout, order placement and confirmation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Redirect, Response};
use axum::Form;
use rungear_cache::Ticket;
use rungear_commerce::checkout::{CheckoutForm, CheckoutOutcome, PlaceOrderOutcome};
use serde::Deserialize;

use crate::error::AppError;
use crate::session::CurrentSession;
use crate::state::AppState;

const EMPTY_CART: &str = "Your cart is empty.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckoutSubmission {
    #[serde(flatten)]
    form: CheckoutForm,
    csrf_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmationQuery {
    ticket: Option<String>,
}

/// `GET /shop/checkout`.
pub(crate) async fn checkout_page(
    State(state): State<AppState>,
    mut session: CurrentSession,
) -> Result<Response, AppError> {
    let ctx = session.data.context();
    match state.checkout.checkout_view(&ctx).await? {
        CheckoutOutcome::EmptyCart => {
            session.data.flash_error(EMPTY_CART);
            session.commit(&state, Redirect::to("/shop/cart"))
        }
        CheckoutOutcome::Ready(view) => {
            let page = session.render(&state, view);
            session.commit(&state, page)
        }
    }
}

/// `POST /shop/checkout`.
pub(crate) async fn place_order(
    State(state): State<AppState>,
    mut session: CurrentSession,
    Form(submission): Form<CheckoutSubmission>,
) -> Result<Response, AppError> {
    session.verify_csrf(&state, submission.csrf_token.as_deref())?;
    let mut ctx = session.data.context();

    match state.checkout.place_order(&mut ctx, submission.form).await? {
        PlaceOrderOutcome::EmptyCart => {
            session.data.flash_error(EMPTY_CART);
            session.commit(&state, Redirect::to("/shop/cart"))
        }
        PlaceOrderOutcome::Invalid(view) => {
            let page = session.render(&state, view);
            session.commit(&state, (StatusCode::UNPROCESSABLE_ENTITY, page))
        }
        PlaceOrderOutcome::Placed(confirmation) => {
            session.data.absorb(&ctx);
            let ticket = state.confirmations.issue(&confirmation)?;
            let location = format!("/shop/order-confirmation?ticket={}", ticket);
            session.commit(&state, Redirect::to(&location))
        }
    }
}

/// `GET /shop/order-confirmation`. Each ticket shows once.
pub(crate) async fn order_confirmation(
    State(state): State<AppState>,
    mut session: CurrentSession,
    Query(query): Query<ConfirmationQuery>,
) -> Result<Response, AppError> {
    let confirmation = match query.ticket.filter(|t| !t.is_empty()) {
        Some(ticket) => state.confirmations.redeem(&Ticket::new(ticket))?,
        None => None,
    };

    match confirmation {
        Some(confirmation) => {
            let page = session.render(&state, confirmation);
            session.commit(&state, page)
        }
        None => {
            tracing::debug!("no confirmation for ticket, redirecting to shop");
            session.commit(&state, Redirect::to("/shop"))
        }
    }
}

/// `GET /shop/orders/:id`. Order history is not served yet.
pub(crate) async fn order_detail(Path(order_id): Path<String>) -> Redirect {
    tracing::debug!(order = %order_id, "order detail requested");
    Redirect::to("/shop")
}
