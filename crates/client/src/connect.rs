//! Connection trait for storage-cluster client libraries.

use crate::ClientResult;
use gridlink_types::ClusterAddr;

/// Connector trait for storage-cluster client libraries.
///
/// Abstracts client construction, allowing different client libraries (or
/// in-memory test clusters) to implement their own connection logic. A
/// connector is held for the lifetime of a [`ClientCache`] and may be asked
/// to build each handle kind at most once per successful construction.
///
/// Construction is expected to block on network I/O; the cache serializes
/// concurrent first-use callers so a connector never races against itself
/// for the same handle kind.
///
/// [`ClientCache`]: crate::ClientCache
pub trait ClientConnect: Send + Sync + 'static {
    /// The synchronous client handle produced by this connector.
    type SyncClient: Send + Sync + 'static;

    /// The asynchronous client handle produced by this connector.
    type AsyncClient: Send + Sync + 'static;

    /// Build a connected synchronous client for the cluster at `addr`.
    fn connect_sync(&self, addr: &ClusterAddr) -> ClientResult<Self::SyncClient>;

    /// Build a connected asynchronous client for the cluster at `addr`.
    fn connect_async(&self, addr: &ClusterAddr) -> ClientResult<Self::AsyncClient>;
}
