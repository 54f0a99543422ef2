//! One-shot tickets for handing a payload to the next request.
//!
//! A ticket names a value that can be redeemed exactly once, and only
//! until its lifetime runs out.

use crate::{Cache, CacheError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use std::time::Duration;

/// Identifier of a one-shot entry, safe to place in a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(String);

impl Ticket {
    /// Wrap an existing ticket string (e.g. from a query parameter).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ticket as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store of single-use payloads of type `T`.
#[derive(Debug, Clone)]
pub struct TicketStore<T> {
    cache: Cache,
    namespace: &'static str,
    ttl: Duration,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> TicketStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a store whose keys live under `namespace`.
    pub fn new(cache: Cache, namespace: &'static str, ttl: Duration) -> Self {
        Self {
            cache,
            namespace,
            ttl,
            _phantom: PhantomData,
        }
    }

    /// Store `value` and return the ticket that redeems it.
    pub fn issue(&self, value: &T) -> Result<Ticket, CacheError> {
        let ticket = Ticket(crate::random_token("tkt"));
        self.cache
            .set_with_ttl(&self.key(&ticket), value, self.ttl)?;
        tracing::debug!(namespace = self.namespace, ticket = %ticket, "ticket issued");
        Ok(ticket)
    }

    /// Redeem a ticket, removing its payload.
    ///
    /// Unknown, already-redeemed, expired and undecodable tickets all
    /// yield `None`.
    pub fn redeem(&self, ticket: &Ticket) -> Result<Option<T>, CacheError> {
        match self.cache.take::<T>(&self.key(ticket)) {
            Ok(value) => Ok(value),
            Err(CacheError::SerializeError(e)) => {
                tracing::warn!(
                    namespace = self.namespace,
                    error = %e,
                    "discarding undecodable ticket payload"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn key(&self, ticket: &Ticket) -> String {
        format!("{}:{}", self.namespace, ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Receipt {
        order_id: String,
    }

    fn store(ttl: Duration) -> TicketStore<Receipt> {
        TicketStore::new(Cache::new(), "receipt", ttl)
    }

    #[test]
    fn test_redeem_once() {
        let store = store(Duration::from_secs(60));
        let ticket = store
            .issue(&Receipt {
                order_id: "RG-2024-000001".into(),
            })
            .unwrap();

        let first = store.redeem(&ticket).unwrap();
        assert_eq!(first.unwrap().order_id, "RG-2024-000001");
        assert!(store.redeem(&ticket).unwrap().is_none());
    }

    #[test]
    fn test_unknown_ticket() {
        let store = store(Duration::from_secs(60));
        assert!(store.redeem(&Ticket::new("tkt_nope")).unwrap().is_none());
    }

    #[test]
    fn test_expired_ticket() {
        let store = store(Duration::ZERO);
        let ticket = store
            .issue(&Receipt {
                order_id: "x".into(),
            })
            .unwrap();
        assert!(store.redeem(&ticket).unwrap().is_none());
    }

    #[test]
    fn test_undecodable_payload_is_none() {
        let cache = Cache::new();
        let store: TicketStore<Receipt> =
            TicketStore::new(cache.clone(), "receipt", Duration::from_secs(60));
        cache.set("receipt:tkt_bad", &42_u32).unwrap();
        assert!(store.redeem(&Ticket::new("tkt_bad")).unwrap().is_none());
    }

    #[test]
    fn test_tickets_are_url_safe() {
        let store = store(Duration::from_secs(60));
        let ticket = store.issue(&Receipt { order_id: "y".into() }).unwrap();
        assert!(ticket
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }
}
