//! Statement fragments: anything that renders to SQL text plus a flat argument list.

use crate::error::{MergeError, MergeResult};
use crate::param::Param;
use crate::placeholder::count_markers;
use crate::value::Value;
use std::fmt::Debug;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A piece of SQL that renders itself with generic `?` markers.
///
/// The returned arguments line up with the markers left to right. Dialect
/// rewriting is never done here; the outermost statement does it once.
pub trait Sqlizer: Debug + Send + Sync {
    /// Render to `(sql, args)`.
    fn to_sql(&self) -> MergeResult<(String, Vec<Param>)>;
}

/// Shared, type-erased fragment as stored inside builders.
pub type Fragment = Arc<dyn Sqlizer>;

impl<S: Sqlizer + ?Sized> Sqlizer for Arc<S> {
    fn to_sql(&self) -> MergeResult<(String, Vec<Param>)> {
        (**self).to_sql()
    }
}

impl<S: Sqlizer + ?Sized> Sqlizer for Box<S> {
    fn to_sql(&self) -> MergeResult<(String, Vec<Param>)> {
        (**self).to_sql()
    }
}

/// Raw SQL text with bound values.
///
/// Each unescaped `?` consumes one arg. Args that are themselves fragments
/// are spliced in place of their marker, so `Expr::new("x = ?")` with a
/// sub-select arg renders `x = (SELECT ...)`-style text when the fragment
/// brings its own parentheses.
#[derive(Clone, Debug)]
pub struct Expr {
    sql: String,
    args: Vec<Value>,
}

/// Start a raw expression.
pub fn expr(sql: impl Into<String>) -> Expr {
    Expr::new(sql)
}

impl Expr {
    /// Create an expression without args.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    /// Bind a scalar for the next marker.
    pub fn bind<T: ToSql + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.args.push(Value::bind(value));
        self
    }

    /// Bind any cell value (scalar, NULL, typed or nested fragment) for the next marker.
    pub fn arg(mut self, value: Value) -> Self {
        self.args.push(value);
        self
    }

    /// Bind several values in order.
    pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(values);
        self
    }

    /// The raw text as given.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl Sqlizer for Expr {
    fn to_sql(&self) -> MergeResult<(String, Vec<Param>)> {
        let expected = count_markers(&self.sql);
        if expected != self.args.len() {
            return Err(MergeError::ArgCount {
                expected,
                got: self.args.len(),
            });
        }

        // Fast path: plain scalars keep the text untouched.
        if self.args.iter().all(|a| matches!(a, Value::Param(_))) {
            let args = self
                .args
                .iter()
                .filter_map(|a| match a {
                    Value::Param(p) => Some(p.clone()),
                    _ => None,
                })
                .collect();
            return Ok((self.sql.clone(), args));
        }

        let mut out = String::with_capacity(self.sql.len());
        let mut args = Vec::new();
        let mut values = self.args.iter();
        let mut chars = self.sql.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '?' {
                out.push(c);
                continue;
            }
            if chars.peek() == Some(&'?') {
                chars.next();
                out.push_str("??");
                continue;
            }
            let Some(value) = values.next() else {
                return Err(MergeError::ArgCount {
                    expected,
                    got: self.args.len(),
                });
            };
            value.render(&mut out, &mut args)?;
        }

        Ok((out, args))
    }
}

/// Render `parts` joined by `sep`, appending their args in order.
pub(crate) fn append_to_sql(
    parts: &[Fragment],
    out: &mut String,
    sep: &str,
    args: &mut Vec<Param>,
) -> MergeResult<()> {
    let mut first = true;
    for part in parts {
        let (sql, part_args) = part.to_sql()?;
        if sql.is_empty() {
            continue;
        }
        if !first {
            out.push_str(sep);
        }
        first = false;
        out.push_str(&sql);
        args.extend(part_args);
    }
    Ok(())
}
