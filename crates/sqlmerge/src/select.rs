//! Minimal SELECT builder, used as a `MERGE ... USING (SELECT ...)` source.

use crate::condition::Eq;
use crate::error::{MergeError, MergeResult};
use crate::fragment::{Expr, Fragment, Sqlizer, append_to_sql};
use crate::param::Param;
use crate::placeholder::PlaceholderFormat;
use crate::snapshot::Snapshot;
use crate::value::Value;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
struct SelectData {
    placeholder_format: PlaceholderFormat,
    columns: Vec<String>,
    from: String,
    joins: Vec<String>,
    wheres: Vec<Fragment>,
    group_by: Vec<String>,
    having: Vec<Fragment>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

/// SELECT query builder.
///
/// Every method borrows the receiver and returns a new builder.
#[derive(Clone, Debug)]
pub struct SelectQb {
    data: Snapshot<SelectData>,
}

/// Start a SELECT with the given result columns.
///
/// # Example
/// ```ignore
/// let sb = sqlmerge::select(["id", "name"]).from("users").where_eq(Eq::new().and("id", 1i64));
/// ```
pub fn select<I, S>(columns: I) -> SelectQb
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SelectQb::new().columns(columns)
}

impl Default for SelectQb {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectQb {
    /// Create an empty SELECT builder.
    pub fn new() -> Self {
        Self {
            data: Snapshot::new(SelectData::default()),
        }
    }

    // ==================== Clauses ====================

    /// Set the placeholder dialect used by [`SelectQb::to_sql`].
    pub fn placeholder_format(&self, format: PlaceholderFormat) -> Self {
        self.with(self.data.set(|d| &mut d.placeholder_format, format))
    }

    /// Add result columns.
    pub fn columns<I, S>(&self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(self.data.extend(|d| &mut d.columns, columns.into_iter().map(Into::into)))
    }

    /// Set the FROM clause (table name or any relation expression).
    pub fn from(&self, from: &str) -> Self {
        self.with(self.data.set(|d| &mut d.from, from.to_string()))
    }

    /// Add `INNER JOIN <table> ON <on>`.
    pub fn inner_join(&self, table: &str, on: &str) -> Self {
        self.with(self.data.append(|d| &mut d.joins, format!("INNER JOIN {table} ON {on}")))
    }

    /// Add `LEFT JOIN <table> ON <on>`.
    pub fn left_join(&self, table: &str, on: &str) -> Self {
        self.with(self.data.append(|d| &mut d.joins, format!("LEFT JOIN {table} ON {on}")))
    }

    /// Add a WHERE fragment; fragments are joined with `AND`.
    pub fn where_expr<S: Sqlizer + 'static>(&self, pred: S) -> Self {
        let pred: Fragment = Arc::new(pred);
        self.with(self.data.append(|d| &mut d.wheres, pred))
    }

    /// Add a raw WHERE expression with `?` markers and its args.
    pub fn where_raw(&self, sql: &str, args: impl IntoIterator<Item = Value>) -> Self {
        self.where_expr(Expr::new(sql).args(args))
    }

    /// Add an equality-map WHERE fragment.
    pub fn where_eq(&self, eq: Eq) -> Self {
        self.where_expr(eq)
    }

    /// Add GROUP BY expressions.
    pub fn group_by<I, S>(&self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(self.data.extend(|d| &mut d.group_by, exprs.into_iter().map(Into::into)))
    }

    /// Add a HAVING fragment; fragments are joined with `AND`.
    pub fn having<S: Sqlizer + 'static>(&self, pred: S) -> Self {
        let pred: Fragment = Arc::new(pred);
        self.with(self.data.append(|d| &mut d.having, pred))
    }

    /// Add ORDER BY expressions.
    pub fn order_by<I, S>(&self, exprs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(self.data.extend(|d| &mut d.order_by, exprs.into_iter().map(Into::into)))
    }

    /// Set LIMIT.
    pub fn limit(&self, n: u64) -> Self {
        self.with(self.data.set(|d| &mut d.limit, Some(n)))
    }

    /// Set OFFSET.
    pub fn offset(&self, n: u64) -> Self {
        self.with(self.data.set(|d| &mut d.offset, Some(n)))
    }

    fn with(&self, data: Snapshot<SelectData>) -> Self {
        Self { data }
    }

    // ==================== Build ====================

    /// Render with generic `?` markers.
    fn render(&self) -> MergeResult<(String, Vec<Param>)> {
        let d = &*self.data;
        if d.columns.is_empty() {
            return Err(MergeError::validation(
                "select statements must have at least one result column",
            ));
        }

        let mut sql = String::from("SELECT ");
        let mut args = Vec::new();
        sql.push_str(&d.columns.join(", "));

        if !d.from.is_empty() {
            sql.push_str(" FROM ");
            sql.push_str(&d.from);
        }

        for join in &d.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        if !d.wheres.is_empty() {
            sql.push_str(" WHERE ");
            append_to_sql(&d.wheres, &mut sql, " AND ", &mut args)?;
        }

        if !d.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&d.group_by.join(", "));
        }

        if !d.having.is_empty() {
            sql.push_str(" HAVING ");
            append_to_sql(&d.having, &mut sql, " AND ", &mut args)?;
        }

        if !d.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&d.order_by.join(", "));
        }

        if let Some(limit) = d.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = d.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        Ok((sql, args))
    }

    /// Build the SQL in the configured placeholder dialect.
    pub fn to_sql(&self) -> MergeResult<(String, Vec<Param>)> {
        let (sql, args) = self.render()?;
        Ok((self.data.placeholder_format.replace_placeholders(&sql), args))
    }
}

// Nested use renders generic markers; the outer statement numbers them.
impl Sqlizer for SelectQb {
    fn to_sql(&self) -> MergeResult<(String, Vec<Param>)> {
        self.render()
    }
}
