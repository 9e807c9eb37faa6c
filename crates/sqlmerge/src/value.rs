//! Cell values for value rows and expression args.

use crate::error::MergeResult;
use crate::fragment::{Expr, Fragment, Sqlizer};
use crate::param::Param;
use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// One value position inside a `VALUES` row (or an expression arg).
#[derive(Clone)]
pub enum Value {
    /// A bound scalar, rendered as a marker.
    Param(Param),
    /// Literal `NULL`, no arg.
    Null,
    /// A nested fragment, inlined with its args flattened in place.
    Fragment(Fragment),
    /// A value followed by an explicit `::type` cast.
    Typed { type_name: String, value: Box<Value> },
}

impl Value {
    /// Bind a scalar.
    pub fn bind<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Value::Param(Param::new(value))
    }

    /// Literal `NULL`.
    pub fn null() -> Self {
        Value::Null
    }

    /// A raw SQL expression in value position, e.g. `Value::expr(expr("NOW()"))`.
    pub fn expr(expr: Expr) -> Self {
        Value::Fragment(Arc::new(expr))
    }

    /// Any fragment in value position (sub-select, condition, ...).
    pub fn fragment<S: Sqlizer + 'static>(fragment: S) -> Self {
        Value::Fragment(Arc::new(fragment))
    }

    /// Bind a scalar with an explicit cast, rendered `?::type_name`.
    pub fn typed<T: ToSql + Send + Sync + 'static>(type_name: impl Into<String>, value: T) -> Self {
        Value::bind(value).cast(type_name)
    }

    /// Wrap this value in a `::type_name` cast.
    pub fn cast(self, type_name: impl Into<String>) -> Self {
        Value::Typed {
            type_name: type_name.into(),
            value: Box::new(self),
        }
    }

    /// Bind a serializable value as `jsonb`.
    pub fn json<T: serde::Serialize>(value: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_value(value)?;
        Ok(Value::bind(json).cast("jsonb"))
    }

    /// Render this cell, appending its args in order.
    pub(crate) fn render(&self, out: &mut String, args: &mut Vec<Param>) -> MergeResult<()> {
        match self {
            Value::Param(p) => {
                out.push('?');
                args.push(p.clone());
            }
            Value::Null => out.push_str("NULL"),
            Value::Fragment(f) => {
                let (sql, fargs) = f.to_sql()?;
                out.push_str(&sql);
                args.extend(fargs);
            }
            Value::Typed { type_name, value } => {
                value.render(out, args)?;
                out.push_str("::");
                out.push_str(type_name);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Param(p) => f.debug_tuple("Param").field(p).finish(),
            Value::Null => f.write_str("Null"),
            Value::Fragment(frag) => f.debug_tuple("Fragment").field(frag).finish(),
            Value::Typed { type_name, value } => f
                .debug_struct("Typed")
                .field("type_name", type_name)
                .field("value", value)
                .finish(),
        }
    }
}

impl From<Param> for Value {
    fn from(param: Param) -> Self {
        Value::Param(param)
    }
}

impl From<Expr> for Value {
    fn from(expr: Expr) -> Self {
        Value::expr(expr)
    }
}
