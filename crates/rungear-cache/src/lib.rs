//! Typed in-process key-value cache for RunGear.
//!
//! Provides a simple, ergonomic API for caching data with automatic JSON
//! serialization, plus two stores built on it: sessions and one-shot
//! tickets.
//!
//! # Example
//!
//! ```rust,ignore
//! use rungear_cache::Cache;
//!
//! let cache = Cache::new();
//!
//! // Store a value
//! cache.set("promo:RUN10", &promo)?;
//!
//! // Retrieve a value
//! let promo: Option<Promo> = cache.get("promo:RUN10")?;
//!
//! // Retrieve and remove in one step
//! let promo: Option<Promo> = cache.take("promo:RUN10")?;
//! ```

mod error;
mod kv;
mod session;
mod ticket;

pub use error::CacheError;
pub use kv::{Cache, SWEEP_EVERY_WRITES};
pub use session::{Session, SessionData, SessionId, DEFAULT_SESSION_TTL};
pub use ticket::{Ticket, TicketStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, Session, SessionId, Ticket, TicketStore};
}

/// Random URL-safe token with a readable prefix, e.g. `sess_…`.
pub fn random_token(prefix: &str) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::Rng;

    let bytes: [u8; 18] = rand::thread_rng().gen();
    format!("{}_{}", prefix, URL_SAFE_NO_PAD.encode(bytes))
}
