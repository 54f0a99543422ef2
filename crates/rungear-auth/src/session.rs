//! Per-shopper session state.

use rungear_commerce::context::{AppliedPromo, ShopContext};
use rungear_commerce::ids::MemberId;
use rungear_commerce::money::Money;
use serde::{Deserialize, Serialize};

/// Kind of a one-shot message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A message shown once on the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

/// Everything remembered about a shopper between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSession {
    /// Identified member; `None` browses as the guest member.
    pub member_id: Option<i64>,
    /// Applied promo code.
    pub promo_code: Option<String>,
    /// Discount of the applied promo, in centavos.
    pub discount_cents: i64,
    /// Messages waiting for the next page.
    pub flash: Vec<FlashMessage>,
}

impl ShopSession {
    /// A fresh session for `member_id`, or a guest session.
    pub fn new(member_id: Option<i64>) -> Self {
        Self {
            member_id,
            ..Self::default()
        }
    }

    /// Member the services should act for.
    pub fn member(&self) -> MemberId {
        self.member_id.map(MemberId::new).unwrap_or(MemberId::GUEST)
    }

    /// Service context built from this session.
    pub fn context(&self) -> ShopContext {
        let promo = match &self.promo_code {
            Some(code) if self.discount_cents > 0 => Some(AppliedPromo {
                code: code.clone(),
                discount: Money::php(self.discount_cents),
            }),
            _ => None,
        };
        ShopContext {
            member_id: self.member(),
            promo,
        }
    }

    /// Take back promo state from a context after a service call.
    pub fn absorb(&mut self, ctx: &ShopContext) {
        match &ctx.promo {
            Some(promo) => {
                self.promo_code = Some(promo.code.clone());
                self.discount_cents = promo.discount.amount_cents;
            }
            None => {
                self.promo_code = None;
                self.discount_cents = 0;
            }
        }
    }

    /// Queue a success message.
    pub fn flash_success(&mut self, text: impl Into<String>) {
        self.flash.push(FlashMessage {
            kind: FlashKind::Success,
            text: text.into(),
        });
    }

    /// Queue an error message.
    pub fn flash_error(&mut self, text: impl Into<String>) {
        self.flash.push(FlashMessage {
            kind: FlashKind::Error,
            text: text.into(),
        });
    }

    /// Remove and return queued messages.
    pub fn take_flash(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.flash)
    }

    /// Replay what one request changed, going from `before` to `after`,
    /// onto this copy of the session.
    ///
    /// Fields the request left alone keep their current value. Messages the
    /// request showed are dropped and messages it queued are appended.
    pub fn apply_changes(&mut self, before: &ShopSession, after: &ShopSession) {
        if before.member_id != after.member_id {
            self.member_id = after.member_id;
        }
        if before.promo_code != after.promo_code || before.discount_cents != after.discount_cents {
            self.promo_code = after.promo_code.clone();
            self.discount_cents = after.discount_cents;
        }

        for shown in difference(&before.flash, &after.flash) {
            if let Some(pos) = self.flash.iter().position(|m| m == shown) {
                self.flash.remove(pos);
            }
        }
        self.flash
            .extend(difference(&after.flash, &before.flash).into_iter().cloned());
    }
}

/// Messages in `a` that `b` does not account for, counting duplicates.
fn difference<'a>(a: &'a [FlashMessage], b: &[FlashMessage]) -> Vec<&'a FlashMessage> {
    let mut unmatched: Vec<&FlashMessage> = b.iter().collect();
    a.iter()
        .filter(|m| match unmatched.iter().position(|u| u == m) {
            Some(pos) => {
                unmatched.swap_remove(pos);
                false
            }
            None => true,
        })
        .collect()
}
