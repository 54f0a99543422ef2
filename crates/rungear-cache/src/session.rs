//! Session storage on top of the key-value cache.

use crate::{Cache, CacheError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new cryptographically secure session ID.
    pub fn generate() -> Self {
        Self(crate::random_token("sess"))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Session data stored in the cache.
///
/// Generic over the user data type `T`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData<T> {
    /// The session ID.
    pub id: SessionId,
    /// User-defined session data.
    pub data: T,
    /// Incremented on every write.
    pub version: u64,
    /// When the session was created (Unix timestamp).
    pub created_at: u64,
    /// When the session was last written (Unix timestamp).
    pub last_accessed: u64,
}

/// Session manager for user sessions.
///
/// Every write refreshes the session's expiry (sliding expiration).
///
/// # Example
///
/// ```rust,ignore
/// use rungear_cache::{Cache, Session, SessionId};
///
/// let sessions = Session::<ShopSession>::new(Cache::new());
/// let id = SessionId::generate();
/// sessions.update(&id, |current| current.unwrap_or_default())?;
/// ```
#[derive(Debug, Clone)]
pub struct Session<T> {
    cache: Cache,
    ttl: Duration,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Session<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Create a session manager over `cache` with the default lifetime.
    pub fn new(cache: Cache) -> Self {
        Self::with_ttl(cache, DEFAULT_SESSION_TTL)
    }

    /// Create a session manager with a custom lifetime.
    pub fn with_ttl(cache: Cache, ttl: Duration) -> Self {
        Self {
            cache,
            ttl,
            _phantom: PhantomData,
        }
    }

    /// Get session data if it exists.
    pub fn get(&self, id: &SessionId) -> Result<Option<T>, CacheError> {
        Ok(self.get_versioned(id)?.map(|s| s.data))
    }

    /// Get full session data including version.
    pub fn get_versioned(&self, id: &SessionId) -> Result<Option<SessionData<T>>, CacheError> {
        self.cache.get::<SessionData<T>>(&session_key(id))
    }

    /// Replace the stored session data with `f(current)` and return it.
    ///
    /// The read and the write happen as one step, so concurrent updates to
    /// the same session never overwrite each other. `f` sees `None` when
    /// the session is missing or expired.
    pub fn update<F>(&self, id: &SessionId, f: F) -> Result<T, CacheError>
    where
        F: FnOnce(Option<T>) -> T,
    {
        let now = unix_now();
        let stored = self.cache.update(
            &session_key(id),
            Some(self.ttl),
            |previous: Option<SessionData<T>>| match previous {
                Some(previous) => SessionData {
                    id: id.clone(),
                    data: f(Some(previous.data)),
                    version: previous.version + 1,
                    created_at: previous.created_at,
                    last_accessed: now,
                },
                None => SessionData {
                    id: id.clone(),
                    data: f(None),
                    version: 1,
                    created_at: now,
                    last_accessed: now,
                },
            },
        )?;
        Ok(stored.data)
    }
}

fn session_key(id: &SessionId) -> String {
    format!("session:{}", id)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Visit {
        member_id: Option<i64>,
        promo: Option<String>,
    }

    #[test]
    fn test_session_id_generate_format() {
        let id = SessionId::generate();
        let s = id.as_str();

        assert!(s.starts_with("sess_"));
        // Base64 encoded 18 bytes = 24 chars, plus "sess_" = 29 chars
        assert_eq!(s.len(), 29);
    }

    #[test]
    fn test_session_id_generate_uniqueness() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn test_session_id_serialization() {
        let id = SessionId::new("serialize-me");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""serialize-me""#);
    }

    #[test]
    fn test_missing_session_is_none() {
        let sessions = Session::<Visit>::new(Cache::new());
        assert_eq!(sessions.get(&SessionId::new("a")).unwrap(), None);
    }

    #[test]
    fn test_update_bumps_version() {
        let sessions = Session::<Visit>::new(Cache::new());
        let id = SessionId::new("b");

        sessions
            .update(&id, |current| {
                assert!(current.is_none());
                Visit {
                    member_id: Some(7),
                    promo: None,
                }
            })
            .unwrap();
        let updated = sessions
            .update(&id, |current| Visit {
                promo: Some("RUN10".into()),
                ..current.unwrap()
            })
            .unwrap();

        assert_eq!(updated.member_id, Some(7));
        let versioned = sessions.get_versioned(&id).unwrap().unwrap();
        assert_eq!(versioned.version, 2);
        assert_eq!(versioned.data, updated);
    }

    #[test]
    fn test_expired_session_is_gone() {
        let sessions = Session::<Visit>::with_ttl(Cache::new(), Duration::ZERO);
        let id = SessionId::new("c");
        sessions.update(&id, |_| Visit::default()).unwrap();
        assert_eq!(sessions.get(&id).unwrap(), None);
    }
}
