//! Scoped SQLite access layer for the RunGear storefront.
//!
//! Every call opens its own connection and releases it when the call
//! returns, so no connection outlives a single request.
//!
//! # Example
//!
//! ```rust,ignore
//! use rungear_db::{Db, params};
//!
//! let db = Db::open("rungear.db")?;
//!
//! db.execute(
//!     "INSERT INTO promo_codes (code, discount_cents) VALUES (?, ?)",
//!     params!["RUN10", 10_000],
//! )?;
//!
//! let rows = db.query("SELECT code FROM promo_codes", params![])?;
//! ```

mod db;
mod error;
mod types;

pub use db::{Conn, Db};
pub use error::DbError;
pub use types::{FromRow, QueryResult, Row, Value};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{params, Conn, Db, DbError, FromRow, QueryResult, Row, Value};
}

/// Create a parameter list for SQL queries.
///
/// # Example
///
/// ```rust,ignore
/// use rungear_db::params;
///
/// let params = params!["RUN10", 42, 3.14];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[] as &[$crate::Value]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
