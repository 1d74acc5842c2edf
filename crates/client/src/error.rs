//! Error types for storage-cluster client operations.

use gridlink_types::ClusterAddr;

/// Result type alias for client operations.
pub type ClientResult<T, E = ClientError> = Result<T, E>;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Failed to build a connected client for the cluster.
    ///
    /// Construction failures are transient from the cache's point of view:
    /// the cache slot stays empty and the next caller retries.
    #[error("failed to connect to storage cluster at {addr}: {source}")]
    Connection {
        /// The address the connection attempt targeted.
        addr: ClusterAddr,
        /// The underlying client-library error.
        source: Box<dyn core::error::Error + Send + Sync + 'static>,
    },

    /// A scan cursor failed while pulling a batch from the cluster.
    #[error("scan failed: {0}")]
    Scan(#[from] Box<dyn core::error::Error + Send + Sync + 'static>),
}

impl ClientError {
    /// Create a new connection error from any error type.
    pub fn connection<E>(addr: ClusterAddr, source: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::Connection { addr, source: Box::new(source) }
    }

    /// Create a new scan error from any error type.
    pub fn scan<E>(source: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::Scan(Box::new(source))
    }
}
