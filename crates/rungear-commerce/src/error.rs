//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in storefront operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// The backing store failed or rejected the call.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Cart line not found.
    #[error("Cart item not found: {0}")]
    CartItemNotFound(i64),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CommerceError {
    /// Whether the caller supplied bad input, as opposed to a backend fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CommerceError::ProductNotFound(_)
                | CommerceError::CartItemNotFound(_)
                | CommerceError::InvalidQuantity(_)
        )
    }
}

#[cfg(feature = "storage")]
impl From<rungear_db::DbError> for CommerceError {
    fn from(e: rungear_db::DbError) -> Self {
        CommerceError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
