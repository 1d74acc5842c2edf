//! Broadcast handles for once-per-worker values.

use std::sync::Arc;

/// A handle to a value shipped to each worker once, rather than captured by
/// every partition body copy.
///
/// In-process this is an [`Arc`]; a distributed engine substitutes its own
/// broadcast machinery behind the same surface. Cloning the handle is cheap
/// and never re-ships the value.
#[derive(Debug)]
pub struct BroadcastRef<T: ?Sized> {
    value: Arc<T>,
}

impl<T> BroadcastRef<T> {
    /// Wrap a value for broadcast.
    pub fn new(value: T) -> Self {
        Self { value: Arc::new(value) }
    }
}

impl<T: ?Sized> BroadcastRef<T> {
    /// Wrap an already-shared value for broadcast.
    pub const fn from_shared(value: Arc<T>) -> Self {
        Self { value }
    }

    /// Access the broadcast value.
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: ?Sized> Clone for BroadcastRef<T> {
    fn clone(&self) -> Self {
        Self { value: self.value.clone() }
    }
}

impl<T: ?Sized> std::ops::Deref for BroadcastRef<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}
