//! Session lookup, persistence and cookie formatting.
//!
//! The cookie carries the session id plus a keyed signature, and the
//! anti-forgery token is derived from the id with the same key. Neither
//! needs anything stored, so a visitor is only written to the cache once a
//! request actually changes their session.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use rungear_cache::{Cache, Session, SessionId, DEFAULT_SESSION_TTL};
use sha2::Sha256;

use crate::{AuthError, ShopSession};

type HmacSha256 = Hmac<Sha256>;

const COOKIE_PURPOSE: &str = "session";
const CSRF_PURPOSE: &str = "csrf";

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Session lifetime, refreshed on every write.
    pub ttl: Duration,
    /// Add the `Secure` attribute to the cookie.
    pub secure_cookie: bool,
    /// Whether to require anti-forgery tokens on posts.
    pub csrf_enabled: bool,
    /// Member assigned to new sessions; `None` starts them as guests.
    pub default_member_id: Option<i64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "rungear_session".to_string(),
            ttl: DEFAULT_SESSION_TTL,
            secure_cookie: false,
            csrf_enabled: true,
            default_member_id: None,
        }
    }
}

/// A session resolved for one request.
#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub id: SessionId,
    pub data: ShopSession,
    /// Nothing is stored under `id` yet.
    pub is_new: bool,
}

/// Loads and stores shopper sessions.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Session<ShopSession>,
    config: SessionConfig,
    key: Arc<[u8; 32]>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager with a random signing key.
    pub fn new(cache: Cache, config: SessionConfig) -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self::with_key(cache, config, key)
    }

    /// Create a manager with a fixed signing key.
    pub fn with_key(cache: Cache, config: SessionConfig, key: [u8; 32]) -> Self {
        Self {
            sessions: Session::with_ttl(cache, config.ttl),
            config,
            key: Arc::new(key),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Resolve the session named by `cookie`, starting one if needed.
    ///
    /// Never writes: a started session is stored by the first
    /// [`save_changes`](Self::save_changes) that has something to keep.
    pub fn load(&self, cookie: Option<&str>) -> Result<LoadedSession, AuthError> {
        let signed = cookie
            .filter(|c| !c.is_empty())
            .and_then(|c| self.verified_id(c));

        let id = match signed {
            Some(id) => {
                if let Some(data) = self.sessions.get(&id)? {
                    return Ok(LoadedSession {
                        id,
                        data,
                        is_new: false,
                    });
                }
                id
            }
            None => {
                if cookie.is_some_and(|c| !c.is_empty()) {
                    tracing::debug!("session cookie failed verification, starting a new session");
                }
                SessionId::generate()
            }
        };

        Ok(LoadedSession {
            id,
            data: ShopSession::new(self.config.default_member_id),
            is_new: true,
        })
    }

    /// Write what a request changed between `before` and `after`.
    ///
    /// Does nothing when the request changed nothing. Otherwise the changes
    /// are merged into whatever is stored now, so a concurrent request's
    /// writes to other fields survive.
    pub fn save_changes(
        &self,
        id: &SessionId,
        before: &ShopSession,
        after: &ShopSession,
    ) -> Result<(), AuthError> {
        if before == after {
            return Ok(());
        }
        let default_member_id = self.config.default_member_id;
        self.sessions.update(id, |current| {
            let mut merged = current.unwrap_or_else(|| ShopSession::new(default_member_id));
            merged.apply_changes(before, after);
            merged
        })?;
        Ok(())
    }

    /// Anti-forgery token for forms rendered in session `id`.
    pub fn csrf_token(&self, id: &SessionId) -> String {
        self.sign(CSRF_PURPOSE, id)
    }

    /// Check a submitted anti-forgery token against session `id`.
    pub fn verify_csrf(&self, id: &SessionId, token: Option<&str>) -> Result<(), AuthError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(AuthError::CsrfMissing)?;
        if self.verify(CSRF_PURPOSE, id, token) {
            Ok(())
        } else {
            Err(AuthError::CsrfMismatch)
        }
    }

    /// `Set-Cookie` value carrying `id`.
    pub fn set_cookie(&self, id: &SessionId) -> String {
        let signature = self.sign(COOKIE_PURPOSE, id);
        let mut cookie = format!(
            "{}={}.{}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.config.cookie_name,
            id,
            signature,
            self.config.ttl.as_secs()
        );
        if self.config.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// Find this manager's cookie in a `Cookie` request header.
    pub fn cookie_value<'a>(&self, header: &'a str) -> Option<&'a str> {
        header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == self.config.cookie_name).then_some(value)
        })
    }

    fn verified_id(&self, cookie: &str) -> Option<SessionId> {
        let (id, signature) = cookie.rsplit_once('.')?;
        let id = SessionId::new(id);
        self.verify(COOKIE_PURPOSE, &id, signature).then_some(id)
    }

    fn mac(&self, purpose: &str, id: &SessionId) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.key.as_slice()).ok()?;
        mac.update(purpose.as_bytes());
        mac.update(b":");
        mac.update(id.as_str().as_bytes());
        Some(mac)
    }

    fn sign(&self, purpose: &str, id: &SessionId) -> String {
        self.mac(purpose, id)
            .map(|mac| URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
            .unwrap_or_default()
    }

    fn verify(&self, purpose: &str, id: &SessionId, encoded: &str) -> bool {
        let (Ok(signature), Some(mac)) = (URL_SAFE_NO_PAD.decode(encoded), self.mac(purpose, id))
        else {
            return false;
        };
        mac.verify_slice(&signature).is_ok()
    }
}
