//! Error types for engine operations.

/// Result type alias for engine operations.
pub type EngineResult<T, E = EngineError> = Result<T, E>;

/// Error type for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A partition body returned an error.
    ///
    /// Transparent so the body's own error message reaches the job driver
    /// unchanged.
    #[error(transparent)]
    Task(Box<dyn core::error::Error + Send + Sync + 'static>),

    /// A worker running a partition panicked.
    #[error("worker panicked while running a partition")]
    WorkerPanic,

    /// A table read could not be planned or started.
    #[error("table read failed: {0}")]
    Read(String),
}

impl EngineError {
    /// Create a new task error from any error type.
    pub fn task<E>(error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::Task(Box::new(error))
    }
}
