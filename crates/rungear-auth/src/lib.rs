//! Session module for RunGear.
//!
//! Provides shopper sessions, anti-forgery tokens and flash messages.

mod error;
mod manager;
mod session;

pub use error::AuthError;
pub use manager::{LoadedSession, SessionConfig, SessionManager};
pub use rungear_cache::SessionId;
pub use session::{FlashKind, FlashMessage, ShopSession};
