//! Error types for context operations.

use crate::config::ConfigError;
use gridlink_client::ClientError;
use gridlink_engine::EngineError;

/// Result type alias for context operations.
pub type ContextResult<T, E = ContextError> = Result<T, E>;

/// Error type for context operations.
///
/// Every variant is transparent, so a failure inside a partition body
/// reaches the job driver with its original message intact regardless of how
/// many layers it crossed.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// A storage-cluster client operation failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The execution engine failed to run partitions.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Context configuration was missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A partition body returned an application error.
    #[error(transparent)]
    User(Box<dyn core::error::Error + Send + Sync + 'static>),
}

impl ContextError {
    /// Wrap an application error raised by a partition body.
    pub fn user<E>(error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::User(Box::new(error))
    }
}
