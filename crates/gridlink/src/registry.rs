//! Latest-context registry.
//!
//! Job code that cannot thread a context handle through every call site
//! (checkpoint-restore paths in particular) can recover the most recently
//! built context from a process-wide registry. Only the latest registration
//! is retained; building a new context replaces the previous entry.

use gridlink_types::ClusterAddr;
use parking_lot::Mutex;
use std::{
    any::Any,
    sync::Arc,
};

static GLOBAL: ContextRegistry = ContextRegistry::new();

/// Registry holding the most recently built context.
///
/// Entries are type-erased so the registry does not carry the context's
/// connector type parameter; [`latest`] recovers the concrete type by
/// downcast and returns `None` on a type mismatch.
///
/// [`latest`]: ContextRegistry::latest
#[derive(Debug)]
pub struct ContextRegistry {
    latest: Mutex<Option<(ClusterAddr, Arc<dyn Any + Send + Sync>)>>,
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self { latest: Mutex::new(None) }
    }

    /// The process-wide registry.
    pub const fn global() -> &'static Self {
        &GLOBAL
    }

    /// Register `context` as the latest, replacing any previous entry.
    pub fn register<T: Send + Sync + 'static>(&self, addr: ClusterAddr, context: Arc<T>) {
        tracing::debug!(%addr, "registering latest context");
        *self.latest.lock() = Some((addr, context));
    }

    /// The most recently registered context, if any.
    ///
    /// Returns `None` when nothing is registered or when the registered
    /// context is not a `T`.
    pub fn latest<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let guard = self.latest.lock();
        let (_, context) = guard.as_ref()?;
        context.clone().downcast::<T>().ok()
    }

    /// The cluster address of the most recently registered context, if any.
    pub fn latest_addr(&self) -> Option<ClusterAddr> {
        self.latest.lock().as_ref().map(|(addr, _)| addr.clone())
    }

    /// Drop the registered context, if any.
    pub fn clear(&self) {
        *self.latest.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_registration_wins() {
        let registry = ContextRegistry::new();
        assert!(registry.latest_addr().is_none());

        registry.register("a:7051".into(), Arc::new(1u32));
        registry.register("b:7051".into(), Arc::new(2u32));

        assert_eq!(registry.latest_addr().unwrap().as_str(), "b:7051");
        assert_eq!(*registry.latest::<u32>().unwrap(), 2);
    }

    #[test]
    fn downcast_mismatch_yields_none() {
        let registry = ContextRegistry::new();
        registry.register("a:7051".into(), Arc::new(1u32));
        assert!(registry.latest::<String>().is_none());
    }

    #[test]
    fn clear_drops_entry() {
        let registry = ContextRegistry::new();
        registry.register("a:7051".into(), Arc::new(1u32));
        registry.clear();
        assert!(registry.latest::<u32>().is_none());
        assert!(registry.latest_addr().is_none());
    }
}
