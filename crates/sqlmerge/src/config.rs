//! Execution configuration.

use std::time::Duration;

/// Settings applied when a statement is handed to a [`Runner`](crate::Runner).
///
/// Rendering ignores this entirely; it only affects the execution terminals.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Deadline for every execution. `None` means no timeout (default).
    ///
    /// When set, the plain terminals (`exec`, `query`, `query_row`) behave like
    /// their `*_with_timeout` variants and require a runner with cancellation support.
    pub query_timeout: Option<Duration>,
    /// Emit a debug event with the final SQL before execution.
    pub log_sql: bool,
    /// Truncate logged SQL (in bytes, on a char boundary). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            query_timeout: None,
            log_sql: true,
            max_sql_length: Some(200),
        }
    }
}

impl RunConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query timeout duration.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Turn SQL logging off.
    pub fn quiet(mut self) -> Self {
        self.log_sql = false;
        self
    }
}
