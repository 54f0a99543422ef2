//! Route handlers.

pub(crate) mod cart;
pub(crate) mod catalog;
pub(crate) mod checkout;

pub(crate) async fn healthz() -> &'static str {
    "ok"
}
