//! Running a MERGE statement through a [`Runner`].

use super::MergeBuilder;
use crate::error::{MergeError, MergeResult};
use crate::log;
use crate::param::params_ref;
use crate::runner::{CancelSupport, QueryRower, RowScanner, Runner};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

impl MergeBuilder {
    fn bound_runner(&self) -> MergeResult<&Arc<dyn Runner>> {
        self.data.runner.as_ref().ok_or(MergeError::RunnerNotSet)
    }

    /// Execute with the runner set by [`MergeBuilder::run_with`]; returns affected rows.
    pub async fn exec(&self) -> MergeResult<u64> {
        let runner = self.bound_runner()?;
        self.exec_on(runner.as_ref()).await
    }

    /// Execute on `runner` (a client, transaction or pooled connection).
    pub async fn exec_on<R: Runner + ?Sized>(&self, runner: &R) -> MergeResult<u64> {
        match self.data.run_config.query_timeout {
            Some(timeout) => self.exec_with_timeout_on(runner, timeout).await,
            None => {
                let (sql, args) = self.to_sql()?;
                log::statement(&self.data.run_config, "exec", &sql, args.len());
                runner.execute(&sql, &params_ref(&args)).await
            }
        }
    }

    /// Query with the bound runner and return all rows (e.g. with a `RETURNING` suffix).
    pub async fn query(&self) -> MergeResult<Vec<Row>> {
        let runner = self.bound_runner()?;
        self.query_on(runner.as_ref()).await
    }

    /// Query on `runner` and return all rows.
    pub async fn query_on<R: Runner + ?Sized>(&self, runner: &R) -> MergeResult<Vec<Row>> {
        match self.data.run_config.query_timeout {
            Some(timeout) => self.query_with_timeout_on(runner, timeout).await,
            None => {
                let (sql, args) = self.to_sql()?;
                log::statement(&self.data.run_config, "query", &sql, args.len());
                runner.query(&sql, &params_ref(&args)).await
            }
        }
    }

    /// Query a single row with the bound runner.
    ///
    /// Never fails directly: errors are held by the [`RowScanner`] until it is read.
    pub async fn query_row(&self) -> RowScanner {
        match self.bound_runner() {
            Ok(runner) => self.query_row_on(runner.as_ref()).await,
            Err(err) => RowScanner::from_err(err),
        }
    }

    /// Query a single row on `runner`.
    pub async fn query_row_on<R: Runner + ?Sized>(&self, runner: &R) -> RowScanner {
        if let Some(timeout) = self.data.run_config.query_timeout {
            return self.query_row_with_timeout_on(runner, timeout).await;
        }
        let Some(rower) = runner.query_rower() else {
            return RowScanner::from_err(MergeError::RunnerNotQueryRunner);
        };
        RowScanner::new(self.query_opt_on(rower).await)
    }

    /// Shortcut for `query_row().await.scan(idx)`.
    pub async fn scan<T>(&self, idx: usize) -> MergeResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.query_row().await.scan(idx)
    }

    // ==================== Deadline-aware variants ====================

    /// Like [`MergeBuilder::exec`], abandoning the statement after `timeout`.
    ///
    /// Requires a runner with cancellation support; on expiry a best-effort
    /// cancel is sent and [`MergeError::Timeout`] is returned.
    pub async fn exec_with_timeout(&self, timeout: Duration) -> MergeResult<u64> {
        let runner = self.bound_runner()?;
        self.exec_with_timeout_on(runner.as_ref(), timeout).await
    }

    /// Like [`MergeBuilder::exec_on`] with a deadline.
    pub async fn exec_with_timeout_on<R: Runner + ?Sized>(
        &self,
        runner: &R,
        timeout: Duration,
    ) -> MergeResult<u64> {
        let cancel = runner.cancel_support().ok_or(MergeError::NoContextSupport)?;
        let (sql, args) = self.to_sql()?;
        log::statement(&self.data.run_config, "exec", &sql, args.len());
        let params = params_ref(&args);
        with_deadline("exec", cancel, timeout, runner.execute(&sql, &params)).await
    }

    /// Like [`MergeBuilder::query`] with a deadline.
    pub async fn query_with_timeout(&self, timeout: Duration) -> MergeResult<Vec<Row>> {
        let runner = self.bound_runner()?;
        self.query_with_timeout_on(runner.as_ref(), timeout).await
    }

    /// Like [`MergeBuilder::query_on`] with a deadline.
    pub async fn query_with_timeout_on<R: Runner + ?Sized>(
        &self,
        runner: &R,
        timeout: Duration,
    ) -> MergeResult<Vec<Row>> {
        let cancel = runner.cancel_support().ok_or(MergeError::NoContextSupport)?;
        let (sql, args) = self.to_sql()?;
        log::statement(&self.data.run_config, "query", &sql, args.len());
        let params = params_ref(&args);
        with_deadline("query", cancel, timeout, runner.query(&sql, &params)).await
    }

    /// Like [`MergeBuilder::query_row`] with a deadline.
    pub async fn query_row_with_timeout(&self, timeout: Duration) -> RowScanner {
        match self.bound_runner() {
            Ok(runner) => self.query_row_with_timeout_on(runner.as_ref(), timeout).await,
            Err(err) => RowScanner::from_err(err),
        }
    }

    /// Like [`MergeBuilder::query_row_on`] with a deadline.
    pub async fn query_row_with_timeout_on<R: Runner + ?Sized>(
        &self,
        runner: &R,
        timeout: Duration,
    ) -> RowScanner {
        let Some(rower) = runner.query_rower() else {
            return RowScanner::from_err(MergeError::RunnerNotQueryRunner);
        };
        let Some(cancel) = runner.cancel_support() else {
            return RowScanner::from_err(MergeError::NoContextSupport);
        };
        RowScanner::new(with_deadline("query_row", cancel, timeout, self.query_opt_on(rower)).await)
    }

    /// Shortcut for `query_row_with_timeout(timeout).await.scan(idx)`.
    pub async fn scan_with_timeout<T>(&self, timeout: Duration, idx: usize) -> MergeResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.query_row_with_timeout(timeout).await.scan(idx)
    }

    async fn query_opt_on(&self, rower: &dyn QueryRower) -> MergeResult<Option<Row>> {
        let (sql, args) = self.to_sql()?;
        log::statement(&self.data.run_config, "query_row", &sql, args.len());
        rower.query_opt(&sql, &params_ref(&args)).await
    }
}

/// Race `future` against `timeout`, cancelling through `cancel` when the deadline wins.
async fn with_deadline<T, F>(
    op: &'static str,
    cancel: CancelSupport,
    timeout: Duration,
    future: F,
) -> MergeResult<T>
where
    F: Future<Output = MergeResult<T>>,
{
    tokio::pin!(future);
    tokio::select! {
        result = &mut future => result,
        _ = tokio::time::sleep(timeout) => {
            let server_cancel = cancel.cancel_in_background();
            log::timed_out(op, timeout, server_cancel);
            Err(MergeError::Timeout(timeout))
        }
    }
}
