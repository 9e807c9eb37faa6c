//! Copy-on-write snapshots for fluent builders.
//!
//! A builder is a thin handle around `Snapshot<Data>`. Every fluent call
//! produces a new snapshot with one field set, appended to, or extended;
//! the receiver is never touched, so one base snapshot can be branched into
//! any number of independent chains, including from different threads.

use std::sync::Arc;

/// An immutable, cheaply clonable record.
#[derive(Debug, Default)]
pub struct Snapshot<T>(Arc<T>);

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Snapshot(Arc::clone(&self.0))
    }
}

impl<T> std::ops::Deref for Snapshot<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Clone> Snapshot<T> {
    /// Wrap an initial record.
    pub fn new(data: T) -> Self {
        Snapshot(Arc::new(data))
    }

    /// Copy the record and apply `f` to the copy.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> Self {
        let mut next = T::clone(&self.0);
        f(&mut next);
        Snapshot(Arc::new(next))
    }

    /// Replace one scalar field.
    pub fn set<V>(&self, field: impl FnOnce(&mut T) -> &mut V, value: V) -> Self {
        self.update(|data| *field(data) = value)
    }

    /// Append one item to a sequence field.
    pub fn append<I>(&self, field: impl FnOnce(&mut T) -> &mut Vec<I>, item: I) -> Self {
        self.update(|data| field(data).push(item))
    }

    /// Append many items to a sequence field in one step.
    pub fn extend<I>(
        &self,
        field: impl FnOnce(&mut T) -> &mut Vec<I>,
        items: impl IntoIterator<Item = I>,
    ) -> Self {
        self.update(|data| field(data).extend(items))
    }
}
