//! Per-process lazy cache of connected client handles.

use crate::{ClientConnect, ClientResult};
use gridlink_types::ClusterAddr;
use parking_lot::Mutex;
use std::sync::Arc;

/// A per-process, lazily-initialized cache of connected client handles.
///
/// Holds at most one synchronous and one asynchronous client. Each handle is
/// constructed on first request and shared by every subsequent caller in the
/// process; construction of the two kinds is independent. Callers that race
/// on first use are serialized under the slot lock, so exactly one
/// construction attempt runs at a time and the losers observe the winner's
/// handle.
///
/// A failed construction leaves the slot empty. The lock is not poisoned and
/// the next caller simply retries, so a transient connection failure on one
/// partition does not disable the worker for the rest of the job.
///
/// Handles are never closed; they live until process exit.
pub struct ClientCache<C: ClientConnect> {
    connector: C,
    addr: ClusterAddr,
    sync: Mutex<Option<Arc<C::SyncClient>>>,
    asynchronous: Mutex<Option<Arc<C::AsyncClient>>>,
}

impl<C: ClientConnect> core::fmt::Debug for ClientCache<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClientCache")
            .field("addr", &self.addr)
            .field("sync_initialized", &self.is_sync_initialized())
            .field("async_initialized", &self.is_async_initialized())
            .finish_non_exhaustive()
    }
}

impl<C: ClientConnect> ClientCache<C> {
    /// Create an empty cache for the cluster at `addr`.
    ///
    /// No connection is attempted until a handle is first requested.
    pub const fn new(connector: C, addr: ClusterAddr) -> Self {
        Self {
            connector,
            addr,
            sync: Mutex::new(None),
            asynchronous: Mutex::new(None),
        }
    }

    /// The cluster address this cache connects to.
    pub const fn addr(&self) -> &ClusterAddr {
        &self.addr
    }

    /// Get the shared synchronous client, connecting on first use.
    pub fn sync_client(&self) -> ClientResult<Arc<C::SyncClient>> {
        let mut slot = self.sync.lock();
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        tracing::debug!(addr = %self.addr, "connecting sync client");
        let client = self
            .connector
            .connect_sync(&self.addr)
            .inspect_err(|err| {
                tracing::warn!(addr = %self.addr, %err, "sync client connection failed");
            })
            .map(Arc::new)?;
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Get the shared asynchronous client, connecting on first use.
    pub fn async_client(&self) -> ClientResult<Arc<C::AsyncClient>> {
        let mut slot = self.asynchronous.lock();
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        tracing::debug!(addr = %self.addr, "connecting async client");
        let client = self
            .connector
            .connect_async(&self.addr)
            .inspect_err(|err| {
                tracing::warn!(addr = %self.addr, %err, "async client connection failed");
            })
            .map(Arc::new)?;
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Whether the synchronous client has been constructed.
    pub fn is_sync_initialized(&self) -> bool {
        self.sync.lock().is_some()
    }

    /// Whether the asynchronous client has been constructed.
    pub fn is_async_initialized(&self) -> bool {
        self.asynchronous.lock().is_some()
    }
}
