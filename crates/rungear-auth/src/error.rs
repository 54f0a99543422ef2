//! Session and anti-forgery errors.

use thiserror::Error;

/// Session error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Anti-forgery token missing from the request.
    #[error("anti-forgery token missing")]
    CsrfMissing,

    /// Anti-forgery token does not match the session.
    #[error("CSRF token mismatch")]
    CsrfMismatch,

    /// Cache error.
    #[error("cache error: {0}")]
    Cache(#[from] rungear_cache::CacheError),
}

impl AuthError {
    /// Whether the request should be refused as forged.
    pub fn is_forgery(&self) -> bool {
        matches!(self, AuthError::CsrfMissing | AuthError::CsrfMismatch)
    }
}
