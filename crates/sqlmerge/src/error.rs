//! Error types for sqlmerge

use std::time::Duration;
use thiserror::Error;

/// Result type alias for sqlmerge operations
pub type MergeResult<T> = Result<T, MergeError>;

/// Error types for statement rendering and execution
#[derive(Debug, Error)]
pub enum MergeError {
    /// `MERGE INTO` target is empty
    #[error("statement must specify a table")]
    NoTable,

    /// Neither value rows nor a sub-select were supplied
    #[error("statement must have at least one set of values or select clause")]
    NoValues,

    /// Execution requested without a bound runner
    #[error("cannot run; no runner set (RunWith)")]
    RunnerNotSet,

    /// Bound runner cannot run single-row queries
    #[error("cannot query row; runner is not a QueryRower")]
    RunnerNotQueryRunner,

    /// Bound runner cannot cancel an in-flight statement
    #[error("runner does not support cancellation")]
    NoContextSupport,

    /// Raw expression markers do not line up with its bound args
    #[error("expression has {expected} placeholder(s) but {got} arg(s)")]
    ArgCount { expected: usize, got: usize },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl MergeError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this error was raised before any SQL reached the database.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::NoTable | Self::NoValues | Self::ArgCount { .. } | Self::Validation(_)
        )
    }

    /// Wrap a driver error.
    ///
    /// Driver failures are passed through untouched; the database's own
    /// SQLSTATE stays reachable via `tokio_postgres::Error::as_db_error`.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for MergeError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
