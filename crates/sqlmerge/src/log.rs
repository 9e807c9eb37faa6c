//! SQL debug events via `tracing`.

use crate::config::RunConfig;
use std::time::Duration;

/// Truncate `sql` to at most `max` bytes without splitting a char.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) fn truncate_sql(sql: &str, max: usize) -> &str {
    if sql.len() <= max {
        return sql;
    }
    let mut end = max;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Log the statement that is about to run.
#[cfg(feature = "tracing")]
pub(crate) fn statement(config: &RunConfig, op: &'static str, sql: &str, param_count: usize) {
    if !config.log_sql {
        return;
    }
    let shown = match config.max_sql_length {
        Some(max) if sql.len() > max => format!("{}...", truncate_sql(sql, max)),
        _ => sql.to_string(),
    };
    tracing::debug!(target: "sqlmerge.sql", op, param_count, sql = %shown);
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn statement(_config: &RunConfig, _op: &'static str, _sql: &str, _param_count: usize) {}

/// Log a statement abandoned at its deadline.
#[cfg(feature = "tracing")]
pub(crate) fn timed_out(op: &'static str, timeout: Duration, server_cancel: bool) {
    tracing::warn!(target: "sqlmerge.sql", op, ?timeout, server_cancel, "statement timed out");
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn timed_out(_op: &'static str, _timeout: Duration, _server_cancel: bool) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_sql("MERGE INTO t", 5), "MERGE");
        assert_eq!(truncate_sql("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_char_boundary() {
        // 'é' is two bytes; cutting inside it backs off to the previous boundary.
        assert_eq!(truncate_sql("aé", 2), "a");
    }
}
