//! Equality-map condition fragment.

use crate::error::MergeResult;
use crate::fragment::Sqlizer;
use crate::param::Param;
use crate::placeholder::placeholders;
use crate::value::Value;
use std::collections::BTreeMap;
use tokio_postgres::types::ToSql;

/// One right-hand side of an [`Eq`] entry.
#[derive(Clone, Debug)]
enum EqValue {
    Value(Value),
    List(Vec<Param>),
}

/// `column = value` conditions joined with `AND`.
///
/// Keys are kept in a `BTreeMap`, so two maps with the same entries always
/// render the same text and the same argument order, however they were built.
///
/// # Example
/// ```ignore
/// let cond = Eq::new().and("status", "active").and("id", 7i64);
/// // "id = ? AND status = ?"
/// ```
#[derive(Clone, Debug, Default)]
pub struct Eq {
    entries: BTreeMap<String, EqValue>,
}

impl Eq {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = ?`. A repeated column replaces the earlier entry.
    pub fn and<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_value(column, Value::bind(value))
    }

    /// Add `column = <value>` for any cell value; `Value::Null` renders `IS NULL`.
    pub fn and_value(mut self, column: &str, value: Value) -> Self {
        self.entries.insert(column.to_string(), EqValue::Value(value));
        self
    }

    /// Add `column IS NULL`.
    pub fn null(self, column: &str) -> Self {
        self.and_value(column, Value::Null)
    }

    /// Add `column IN (?, ...)`. An empty list can never match and renders `(1=0)`.
    pub fn any_of<T: ToSql + Send + Sync + 'static>(
        mut self,
        column: &str,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        let list = values.into_iter().map(Param::new).collect();
        self.entries.insert(column.to_string(), EqValue::List(list));
        self
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names in render order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Split into sorted `(columns, values)` for a single `VALUES` row.
    ///
    /// `any_of` entries bind their whole list as one array value.
    pub(crate) fn into_row(self) -> (Vec<String>, Vec<Value>) {
        self.entries
            .into_iter()
            .map(|(col, v)| {
                let value = match v {
                    EqValue::Value(value) => value,
                    EqValue::List(list) => Value::Fragment(std::sync::Arc::new(ArrayLiteral(list))),
                };
                (col, value)
            })
            .unzip()
    }
}

impl Sqlizer for Eq {
    fn to_sql(&self) -> MergeResult<(String, Vec<Param>)> {
        let mut parts = Vec::with_capacity(self.entries.len());
        let mut args = Vec::new();

        for (column, value) in &self.entries {
            match value {
                EqValue::Value(Value::Null) => parts.push(format!("{column} IS NULL")),
                EqValue::Value(value) => {
                    let mut cell = String::new();
                    value.render(&mut cell, &mut args)?;
                    parts.push(format!("{column} = {cell}"));
                }
                EqValue::List(list) if list.is_empty() => parts.push("(1=0)".to_string()),
                EqValue::List(list) => {
                    parts.push(format!("{column} IN ({})", placeholders(list.len())));
                    args.extend(list.iter().cloned());
                }
            }
        }

        Ok((parts.join(" AND "), args))
    }
}

/// `ARRAY[?,?,...]` built from a list entry.
#[derive(Debug)]
struct ArrayLiteral(Vec<Param>);

impl Sqlizer for ArrayLiteral {
    fn to_sql(&self) -> MergeResult<(String, Vec<Param>)> {
        Ok((format!("ARRAY[{}]", placeholders(self.0.len())), self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_render() {
        let cond = Eq::new().and("field3", 3i32).and("field1", 1i32).and("field2", 2i32);
        let (sql, args) = cond.to_sql().unwrap();
        assert_eq!(sql, "field1 = ? AND field2 = ? AND field3 = ?");
        assert_eq!(format!("{args:?}"), "[1, 2, 3]");
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = Eq::new().and("b", 2i32).and("a", 1i32);
        let b = Eq::new().and("a", 1i32).and("b", 2i32);
        assert_eq!(a.to_sql().unwrap().0, b.to_sql().unwrap().0);
        assert_eq!(a.columns().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_null_and_in() {
        let cond = Eq::new().null("deleted_at").any_of("id", vec![1i64, 2, 3]);
        let (sql, args) = cond.to_sql().unwrap();
        assert_eq!(sql, "deleted_at IS NULL AND id IN (?,?,?)");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_empty_in_never_matches() {
        let (sql, args) = Eq::new().any_of("id", Vec::<i64>::new()).to_sql().unwrap();
        assert_eq!(sql, "(1=0)");
        assert!(args.is_empty());
    }

    #[test]
    fn test_typed_entry() {
        let (sql, _) = Eq::new()
            .and_value("id", Value::typed("uuid", "x"))
            .to_sql()
            .unwrap();
        assert_eq!(sql, "id = ?::uuid");
    }

    #[test]
    fn test_empty_map() {
        let (sql, args) = Eq::new().to_sql().unwrap();
        assert!(sql.is_empty());
        assert!(args.is_empty());
    }
}
