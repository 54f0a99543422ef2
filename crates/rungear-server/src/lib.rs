//! HTTP storefront for RunGear.
//!
//! Serves the shop page, cart, checkout and order confirmation as JSON views
//! over the services in `rungear-commerce`. Form posts answer with `303 See
//! Other` redirects; session state lives in a cookie-keyed in-process store.

pub mod config;
pub mod error;
pub mod logging;
mod handlers;
mod middleware;
pub mod session;
pub mod state;

use axum::routing::{get, post};
use axum::Router;

pub use config::{Backend, CliOverrides, ShopConfig};
pub use error::AppError;
pub use logging::{LogFormat, LoggingConfig};
pub use middleware::REQUEST_ID_HEADER;
pub use session::{CurrentSession, PageView, CSRF_HEADER};
pub use state::{open_gateway, AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::catalog::shop_page))
        .route("/shop", get(handlers::catalog::shop_page))
        .route("/shop/cart", get(handlers::cart::view_cart))
        .route("/shop/cart/add", post(handlers::cart::add_to_cart))
        .route("/shop/cart/remove", post(handlers::cart::remove_from_cart))
        .route("/shop/cart/update-qty", post(handlers::cart::update_quantity))
        .route("/shop/cart/promo", post(handlers::cart::apply_promo))
        .route(
            "/shop/checkout",
            get(handlers::checkout::checkout_page).post(handlers::checkout::place_order),
        )
        .route(
            "/shop/order-confirmation",
            get(handlers::checkout::order_confirmation),
        )
        .route("/shop/orders/:id", get(handlers::checkout::order_detail))
        .route("/healthz", get(handlers::healthz))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .with_state(state)
}
