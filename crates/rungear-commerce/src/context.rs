//! Per-request shopper state passed into every service call.

use crate::ids::MemberId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A promo code accepted by the store, with the flat amount it takes off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPromo {
    /// Code as the shopper entered it.
    pub code: String,
    /// Discount amount, always positive.
    pub discount: Money,
}

/// Shopper state for one request.
///
/// The boundary loads this from the session before a service call and
/// writes it back afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopContext {
    /// Current member; [`MemberId::GUEST`] when nobody is identified.
    pub member_id: MemberId,
    /// Promo applied to the cart, if any.
    pub promo: Option<AppliedPromo>,
}

impl ShopContext {
    /// Context for a member with no promo applied.
    pub fn for_member(member_id: MemberId) -> Self {
        Self {
            member_id,
            promo: None,
        }
    }

    /// Context for an unidentified shopper.
    pub fn guest() -> Self {
        Self::default()
    }

    /// Current discount, zero when no promo is applied.
    pub fn discount(&self, currency: Currency) -> Money {
        self.promo
            .as_ref()
            .map_or(Money::zero(currency), |p| p.discount)
    }

    /// Applied promo code, if any.
    pub fn promo_code(&self) -> Option<&str> {
        self.promo.as_ref().map(|p| p.code.as_str())
    }

    /// Drop the applied promo.
    pub fn clear_promo(&mut self) {
        self.promo = None;
    }
}
