//! Database handle and scoped query execution.

use crate::{DbError, FromRow, QueryResult, Row, Value};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Handle to a SQLite database file.
///
/// The handle holds no connection. Every call opens a connection scoped to
/// that call and closes it when the call returns, whether it succeeded or not.
#[derive(Debug, Clone)]
pub struct Db {
    path: PathBuf,
    busy_timeout: Duration,
}

impl Db {
    /// Open (creating if needed) the database at `path`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = Db::open("rungear.db")?;
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let db = Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_secs(5),
        };
        // Unusable paths fail here, not on the first query.
        db.connect()?;
        Ok(db)
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, DbError> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| DbError::OpenError(e.to_string()))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(conn)
    }

    /// Run a closure against a connection scoped to this call.
    pub fn with_conn<R>(&self, f: impl FnOnce(&Conn<'_>) -> Result<R, DbError>) -> Result<R, DbError> {
        let conn = self.connect()?;
        f(&Conn { inner: &conn })
    }

    /// Run a closure inside a transaction, committing on `Ok`.
    ///
    /// The transaction rolls back when the closure fails.
    pub fn transaction<R>(
        &self,
        f: impl FnOnce(&Conn<'_>) -> Result<R, DbError>,
    ) -> Result<R, DbError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let result = f(&Conn { inner: &tx })?;
        tx.commit()?;
        Ok(result)
    }

    /// Execute a batch of semicolon-separated statements.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        self.with_conn(|c| c.execute_batch(sql))
    }

    /// Execute a SQL statement that doesn't return rows.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// db.execute(
    ///     "DELETE FROM cart_items WHERE cart_item_id = ?",
    ///     params![42],
    /// )?;
    /// ```
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize, DbError> {
        self.with_conn(|c| c.execute(sql, params))
    }

    /// Execute a SQL query and return raw results.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        self.with_conn(|c| c.query(sql, params))
    }

    /// Execute a SQL query and map every row.
    pub fn query_as<T: FromRow>(&self, sql: &str, params: &[Value]) -> Result<Vec<T>, DbError> {
        self.with_conn(|c| c.query_as(sql, params))
    }

    /// Execute a SQL query and return an optional single row.
    pub fn query_optional<T: FromRow>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        self.with_conn(|c| c.query_optional(sql, params))
    }
}

/// A borrowed connection, valid for one [`Db`] call.
pub struct Conn<'a> {
    inner: &'a Connection,
}

impl Conn<'_> {
    /// Execute a batch of statements.
    pub fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        self.inner.execute_batch(sql)?;
        Ok(())
    }

    /// Execute a statement, returning the number of changed rows.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize, DbError> {
        let changed = self
            .inner
            .execute(sql, rusqlite::params_from_iter(params.iter()))?;
        tracing::trace!(changed, "sqlite execute");
        Ok(changed)
    }

    /// Execute a query and collect every row.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let mut stmt = self.inner.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        while let Some(raw) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(Value::from_sql_ref(raw.get_ref(i)?));
            }
            rows.push(Row::new(columns.clone(), values));
        }

        Ok(QueryResult::new(columns, rows))
    }

    /// Execute a query and map every row.
    pub fn query_as<T: FromRow>(&self, sql: &str, params: &[Value]) -> Result<Vec<T>, DbError> {
        self.query(sql, params)?.map_all()
    }

    /// Execute a query and map the first row, if any.
    pub fn query_optional<T: FromRow>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        let result = self.query(sql, params)?;
        match result.first() {
            Some(row) => Ok(Some(T::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Execute a query and map exactly one row.
    ///
    /// Returns [`DbError::NotFound`] if no rows are returned.
    pub fn query_one<T: FromRow>(&self, sql: &str, params: &[Value]) -> Result<T, DbError> {
        self.query_optional(sql, params)?.ok_or(DbError::NotFound)
    }
}
