//! MERGE (upsert) statement builder.
//!
//! ```ignore
//! use sqlmerge::{merge, PlaceholderFormat};
//!
//! let (sql, args) = merge("accounts")
//!     .row([1i64, 100])
//!     .values_alias("vals")
//!     .columns(["id", "balance"])
//!     .on("accounts.id = vals.id")
//!     .when("MATCHED THEN UPDATE SET balance = vals.balance")
//!     .when("NOT MATCHED THEN INSERT (id, balance) VALUES (vals.id, vals.balance)")
//!     .placeholder_format(PlaceholderFormat::Dollar)
//!     .to_sql()?;
//! ```

mod exec;
mod render;

use crate::condition::Eq;
use crate::config::RunConfig;
use crate::fragment::{Expr, Fragment, Sqlizer};
use crate::placeholder::PlaceholderFormat;
use crate::runner::Runner;
use crate::select::SelectQb;
use crate::snapshot::Snapshot;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

#[derive(Clone, Default)]
struct MergeData {
    placeholder_format: PlaceholderFormat,
    runner: Option<Arc<dyn Runner>>,
    run_config: RunConfig,
    prefixes: Vec<Fragment>,
    into: String,
    values_alias: Option<String>,
    on: Option<String>,
    when: Vec<String>,
    columns: Vec<String>,
    values: Vec<Vec<Value>>,
    select: Option<SelectQb>,
    suffixes: Vec<Fragment>,
}

/// MERGE statement builder.
///
/// Every method borrows the receiver and returns a new builder, so a
/// partially built statement can be reused as the base of several others.
#[derive(Clone)]
pub struct MergeBuilder {
    data: Snapshot<MergeData>,
}

/// Start a MERGE into `table`.
pub fn merge(table: &str) -> MergeBuilder {
    MergeBuilder::new(table)
}

impl MergeBuilder {
    /// Create a builder targeting `table`.
    pub fn new(table: &str) -> Self {
        Self {
            data: Snapshot::new(MergeData {
                into: table.to_string(),
                ..MergeData::default()
            }),
        }
    }

    fn with(&self, data: Snapshot<MergeData>) -> Self {
        Self { data }
    }

    // ==================== Format / runner ====================

    /// Set the placeholder dialect (e.g. `Question` or `Dollar`).
    pub fn placeholder_format(&self, format: PlaceholderFormat) -> Self {
        self.with(self.data.set(|d| &mut d.placeholder_format, format))
    }

    /// Bind the runner used by `exec`, `query` and `query_row`.
    pub fn run_with(&self, runner: Arc<dyn Runner>) -> Self {
        self.with(self.data.set(|d| &mut d.runner, Some(runner)))
    }

    /// Set execution options.
    pub fn run_config(&self, config: RunConfig) -> Self {
        self.with(self.data.set(|d| &mut d.run_config, config))
    }

    // ==================== Clauses ====================

    /// Add a raw expression to the beginning of the statement.
    pub fn prefix(&self, sql: &str, args: impl IntoIterator<Item = Value>) -> Self {
        self.prefix_expr(Expr::new(sql).args(args))
    }

    /// Add any fragment to the beginning of the statement.
    pub fn prefix_expr<S: Sqlizer + 'static>(&self, expr: S) -> Self {
        let expr: Fragment = Arc::new(expr);
        self.with(self.data.append(|d| &mut d.prefixes, expr))
    }

    /// Set the `MERGE INTO` target.
    pub fn into_table(&self, table: &str) -> Self {
        self.with(self.data.set(|d| &mut d.into, table.to_string()))
    }

    /// Set the `AS <alias>` of the source relation.
    pub fn values_alias(&self, alias: &str) -> Self {
        self.with(self.data.set(|d| &mut d.values_alias, Some(alias.to_string())))
    }

    /// Set the `ON` join condition.
    pub fn on(&self, condition: &str) -> Self {
        self.with(self.data.set(|d| &mut d.on, Some(condition.to_string())))
    }

    /// Add a `WHEN [NOT] MATCHED ...` clause body (without the leading `WHEN`).
    pub fn when(&self, clause: &str) -> Self {
        self.with(self.data.append(|d| &mut d.when, clause.to_string()))
    }

    /// Add source columns.
    pub fn columns<I, S>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(self.data.extend(|d| &mut d.columns, columns.into_iter().map(Into::into)))
    }

    /// Add one `VALUES` row of arbitrary cell values.
    pub fn values(&self, row: impl IntoIterator<Item = Value>) -> Self {
        let row: Vec<Value> = row.into_iter().collect();
        self.with(self.data.append(|d| &mut d.values, row))
    }

    /// Add one `VALUES` row of bound scalars of a single type.
    pub fn row<T: ToSql + Send + Sync + 'static>(&self, row: impl IntoIterator<Item = T>) -> Self {
        self.values(row.into_iter().map(Value::bind))
    }

    /// Add a raw expression to the end of the statement.
    pub fn suffix(&self, sql: &str, args: impl IntoIterator<Item = Value>) -> Self {
        self.suffix_expr(Expr::new(sql).args(args))
    }

    /// Add any fragment to the end of the statement (e.g. `RETURNING`).
    pub fn suffix_expr<S: Sqlizer + 'static>(&self, expr: S) -> Self {
        let expr: Fragment = Arc::new(expr);
        self.with(self.data.append(|d| &mut d.suffixes, expr))
    }

    /// Replace columns and values with a single row taken from `map`.
    ///
    /// Columns come out in sorted key order. Any previously set columns and
    /// rows are discarded.
    pub fn set_map(&self, map: Eq) -> Self {
        let (columns, row) = map.into_row();
        self.with(self.data.update(|d| {
            d.columns = columns;
            d.values = vec![row];
        }))
    }

    /// Use a sub-select as the source relation.
    ///
    /// When both rows and a sub-select are set, the sub-select wins.
    pub fn select(&self, select: SelectQb) -> Self {
        self.with(self.data.set(|d| &mut d.select, Some(select)))
    }
}

impl fmt::Debug for MergeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &*self.data;
        f.debug_struct("MergeBuilder")
            .field("placeholder_format", &d.placeholder_format)
            .field("runner", &d.runner.is_some())
            .field("run_config", &d.run_config)
            .field("prefixes", &d.prefixes)
            .field("into", &d.into)
            .field("values_alias", &d.values_alias)
            .field("on", &d.on)
            .field("when", &d.when)
            .field("columns", &d.columns)
            .field("values", &d.values)
            .field("select", &d.select)
            .field("suffixes", &d.suffixes)
            .finish()
    }
}

#[cfg(test)]
mod tests;
