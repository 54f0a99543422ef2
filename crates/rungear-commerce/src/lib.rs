//! Storefront domain types and services for RunGear.
//!
//! This crate provides the in-process core of the shop:
//!
//! - **Catalog**: Products, filter selections, shop page facets
//! - **Cart**: Cart lines, pricing, promo outcomes
//! - **Checkout**: Form validation, order placement, confirmation snapshots
//! - **Gateway**: The data-store contract, with in-memory and SQLite stores
//! - **Service**: Catalog, cart and checkout services over a gateway
//!
//! # Example
//!
//! ```rust,ignore
//! use rungear_commerce::prelude::*;
//! use std::sync::Arc;
//!
//! let gateway: Arc<dyn ShopGateway> = Arc::new(MemoryGateway::with_demo_data());
//! let carts = CartService::new(gateway.clone(), Arc::new(SystemClock));
//!
//! let mut ctx = ShopContext::for_member(MemberId::new(42));
//! carts.add_item(&ctx, ProductId::new(1), 1).await?;
//! carts.apply_promo(&mut ctx, "RUN10").await?;
//!
//! let cart = carts.get_cart(&ctx).await?;
//! println!("Total: {}", cart.pricing.total);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod context;
pub mod dates;
pub mod gateway;
pub mod service;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        BrandFacet, CatalogFacets, CatalogFilter, CatalogPage, Product, ProductQuery, SortKey,
    };

    // Cart
    pub use crate::cart::{Cart, CartItem, CartPricing, PromoOutcome};

    // Checkout
    pub use crate::checkout::{
        CheckoutForm, CheckoutOutcome, CheckoutView, DeliveryOption, FieldErrors, NewOrder,
        OrderConfirmation, OrderItem, OrderStatus, PaymentMethod, PlaceOrderOutcome,
    };

    // Session state and time
    pub use crate::context::{AppliedPromo, ShopContext};
    pub use crate::dates::{add_business_days, Clock, FixedClock, SystemClock};

    // Gateway and services
    #[cfg(feature = "storage")]
    pub use crate::gateway::SqliteGateway;
    pub use crate::gateway::{MemoryGateway, QuantityFloor, ShopGateway};
    pub use crate::service::{CartService, CatalogService, CheckoutService};
}
