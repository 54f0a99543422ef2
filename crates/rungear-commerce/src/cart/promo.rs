//! Promo code results.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Result of applying a promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "discount", rename_all = "snake_case")]
pub enum PromoOutcome {
    /// The code is valid and takes this amount off.
    Applied(Money),
    /// The code is unknown, expired or worth nothing.
    Invalid,
}

impl PromoOutcome {
    /// Shopper-facing message for this outcome.
    pub fn message(&self) -> String {
        match self {
            PromoOutcome::Applied(discount) => format!(
                "Promo code applied! You saved {}.",
                discount.display_whole()
            ),
            PromoOutcome::Invalid => "Invalid or expired promo code.".to_string(),
        }
    }

    /// Whether the code was accepted.
    pub fn is_applied(&self) -> bool {
        matches!(self, PromoOutcome::Applied(_))
    }
}
