//! Bound argument storage.

use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A clone-friendly bound argument.
///
/// Snapshots are copied on every fluent call, so arguments live behind an
/// `Arc` and copying a builder never copies the values themselves.
#[derive(Clone)]
pub struct Param(pub(crate) Arc<dyn ToSql + Send + Sync>);

impl Param {
    /// Create a new parameter from any ToSql value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// Get a reference to the inner value as a ToSql trait object.
    pub fn as_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

// Prints the wrapped value itself, so `{:?}` of an argument list reads `[0, 1, 2]`.
impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Borrow a rendered argument list in the shape `tokio-postgres` expects.
pub fn params_ref(params: &[Param]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(Param::as_ref).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_shows_value() {
        let params = vec![Param::new(0i32), Param::new("alice"), Param::new(Option::<i64>::None)];
        assert_eq!(format!("{params:?}"), r#"[0, "alice", None]"#);
    }

    #[test]
    fn test_clone_shares_value() {
        let p = Param::new(42i64);
        let q = p.clone();
        assert!(Arc::ptr_eq(&p.0, &q.0));
        assert_eq!(params_ref(&[p, q]).len(), 2);
    }
}
