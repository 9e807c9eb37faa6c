//! Execution adapter: the database handle a statement is run against.
//!
//! Rendering never touches this module. A [`Runner`] only has to execute text
//! plus arguments; optional abilities (single-row queries, cancellation) are
//! exposed as capability queries so callers get a typed error instead of a
//! failed downcast.

use crate::error::{MergeError, MergeResult};
use futures_util::stream::{Stream, TryStreamExt};
use std::fmt;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql};

/// A handle that can execute SQL.
///
/// Implemented for `tokio_postgres::Client`, `tokio_postgres::Transaction`
/// and (feature `pool`) `deadpool_postgres::Client`.
#[async_trait::async_trait]
pub trait Runner: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> MergeResult<u64>;

    /// Execute a query and return all rows.
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> MergeResult<Vec<Row>>;

    /// Single-row query capability, if supported.
    fn query_rower(&self) -> Option<&dyn QueryRower> {
        None
    }

    /// Cancellation capability, if supported.
    ///
    /// Deadline-aware terminals fail with [`MergeError::NoContextSupport`] when this is `None`.
    fn cancel_support(&self) -> Option<CancelSupport> {
        None
    }
}

/// Single-row query capability.
#[async_trait::async_trait]
pub trait QueryRower: Send + Sync {
    /// Execute a query and return the first row, if any.
    async fn query_opt(&self, sql: &str, params: &[&(dyn ToSql + Sync)])
    -> MergeResult<Option<Row>>;
}

/// How an in-flight statement is cancelled once its deadline passes.
#[derive(Clone)]
pub enum CancelSupport {
    /// Send a server-side cancel request through this token.
    Server(tokio_postgres::CancelToken),
    /// Dropping the pending future is enough; there is no server state to clean up.
    DropOnly,
}

// `CancelToken` has no `Debug`; only the variant is shown.
impl fmt::Debug for CancelSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelSupport::Server(_) => f.write_str("Server(..)"),
            CancelSupport::DropOnly => f.write_str("DropOnly"),
        }
    }
}

impl CancelSupport {
    /// Fire a best-effort cancel without waiting for it.
    pub(crate) fn cancel_in_background(self) -> bool {
        match self {
            CancelSupport::Server(token) => {
                tokio::spawn(async move {
                    let _ = token.cancel_query(tokio_postgres::NoTls).await;
                });
                true
            }
            CancelSupport::DropOnly => false,
        }
    }
}

/// The lazily inspected outcome of a single-row query.
///
/// Errors (missing runner, missing capability, driver failure) are held until
/// the row is actually read.
#[must_use]
#[derive(Debug)]
pub struct RowScanner {
    row: MergeResult<Option<Row>>,
}

impl RowScanner {
    pub(crate) fn new(row: MergeResult<Option<Row>>) -> Self {
        Self { row }
    }

    pub(crate) fn from_err(err: MergeError) -> Self {
        Self { row: Err(err) }
    }

    /// The row, or `NotFound` when the query returned nothing.
    pub fn into_row(self) -> MergeResult<Row> {
        self.row?
            .ok_or_else(|| MergeError::not_found("Expected one row, got none"))
    }

    /// The row, if any.
    pub fn into_opt(self) -> MergeResult<Option<Row>> {
        self.row
    }

    /// Read column `idx` of the row.
    pub fn scan<T>(self, idx: usize) -> MergeResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        let row = self.into_row()?;
        row.try_get(idx).map_err(MergeError::from_db_error)
    }

    /// Map the row with `f`.
    pub fn scan_with<T>(self, f: impl FnOnce(&Row) -> MergeResult<T>) -> MergeResult<T> {
        let row = self.into_row()?;
        f(&row)
    }
}

/// Pull the first row off a result stream; the rest is never read.
async fn first_row<S>(stream: S) -> MergeResult<Option<Row>>
where
    S: Stream<Item = Result<Row, tokio_postgres::Error>>,
{
    let mut stream = Box::pin(stream);
    stream.try_next().await.map_err(MergeError::from_db_error)
}

// ===== tokio-postgres =====

#[async_trait::async_trait]
impl Runner for tokio_postgres::Client {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> MergeResult<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(MergeError::from_db_error)
    }

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> MergeResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(MergeError::from_db_error)
    }

    fn query_rower(&self) -> Option<&dyn QueryRower> {
        Some(self)
    }

    fn cancel_support(&self) -> Option<CancelSupport> {
        Some(CancelSupport::Server(tokio_postgres::Client::cancel_token(self)))
    }
}

#[async_trait::async_trait]
impl QueryRower for tokio_postgres::Client {
    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> MergeResult<Option<Row>> {
        let stream = tokio_postgres::Client::query_raw(self, sql, params.iter().copied())
            .await
            .map_err(MergeError::from_db_error)?;
        first_row(stream).await
    }
}

#[async_trait::async_trait]
impl<'a> Runner for tokio_postgres::Transaction<'a> {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> MergeResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(MergeError::from_db_error)
    }

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> MergeResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(MergeError::from_db_error)
    }

    fn query_rower(&self) -> Option<&dyn QueryRower> {
        Some(self)
    }

    fn cancel_support(&self) -> Option<CancelSupport> {
        Some(CancelSupport::Server(tokio_postgres::Transaction::cancel_token(self)))
    }
}

#[async_trait::async_trait]
impl<'a> QueryRower for tokio_postgres::Transaction<'a> {
    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> MergeResult<Option<Row>> {
        let stream = tokio_postgres::Transaction::query_raw(self, sql, params.iter().copied())
            .await
            .map_err(MergeError::from_db_error)?;
        first_row(stream).await
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
#[async_trait::async_trait]
impl Runner for deadpool_postgres::Client {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> MergeResult<u64> {
        let client: &tokio_postgres::Client = self;
        Runner::execute(client, sql, params).await
    }

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> MergeResult<Vec<Row>> {
        let client: &tokio_postgres::Client = self;
        Runner::query(client, sql, params).await
    }

    fn query_rower(&self) -> Option<&dyn QueryRower> {
        let client: &tokio_postgres::Client = self;
        Some(client)
    }

    fn cancel_support(&self) -> Option<CancelSupport> {
        let client: &tokio_postgres::Client = self;
        client.cancel_support()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_scanner_surfaces_held_error() {
        let err = RowScanner::from_err(MergeError::RunnerNotSet).into_row().unwrap_err();
        assert!(matches!(err, MergeError::RunnerNotSet));
    }

    #[test]
    fn test_row_scanner_empty_is_not_found() {
        let err = RowScanner::new(Ok(None)).scan::<i64>(0).unwrap_err();
        assert!(err.is_not_found());
        assert!(RowScanner::new(Ok(None)).into_opt().unwrap().is_none());
    }

    #[test]
    fn test_drop_only_cancel_is_local() {
        assert!(!CancelSupport::DropOnly.cancel_in_background());
    }

    #[test]
    fn test_cancel_support_debug() {
        assert_eq!(format!("{:?}", CancelSupport::DropOnly), "DropOnly");
        assert_eq!(format!("{:?}", Some(CancelSupport::DropOnly)), "Some(DropOnly)");
    }

    #[tokio::test]
    async fn test_first_row_of_empty_stream() {
        let rows: Vec<Result<Row, tokio_postgres::Error>> = Vec::new();
        assert!(first_row(futures_util::stream::iter(rows)).await.unwrap().is_none());
    }
}
