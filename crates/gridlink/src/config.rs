//! Context configuration and environment parsing.
//!
//! # Environment Variables
//!
//! | Variable | Description | Required When |
//! |----------|-------------|---------------|
//! | `GRIDLINK_MASTER_ADDR` | Comma-separated cluster coordinator addresses | Using [`ContextBuilder::from_env`] |
//!
//! [`ContextBuilder::from_env`]: crate::ContextBuilder::from_env

use gridlink_types::{ClusterAddr, InvalidClusterAddr};
use std::env;
use thiserror::Error;

/// Environment variable name for the cluster coordinator addresses.
pub const ENV_MASTER_ADDR: &str = "GRIDLINK_MASTER_ADDR";

/// Load the cluster coordinator addresses from the environment.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] if the variable is not set, or
/// [`ConfigError::InvalidAddr`] if its value cannot be parsed.
pub fn master_addr_from_env() -> Result<ClusterAddr, ConfigError> {
    let value =
        env::var(ENV_MASTER_ADDR).map_err(|_| ConfigError::MissingEnvVar(ENV_MASTER_ADDR))?;
    Ok(value.parse()?)
}

/// Configuration errors.
#[derive(Debug, Clone, Copy, Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// The configured cluster address is invalid.
    #[error("invalid cluster address: {0}")]
    InvalidAddr(#[from] InvalidClusterAddr),

    /// No cluster address was configured on the builder.
    #[error("cluster master address not configured")]
    MissingMasterAddr,
}

/// Serializes tests that mutate process environment variables.
///
/// Tests run on parallel threads; any test touching `GRIDLINK_MASTER_ADDR`
/// must hold this lock from first mutation to last read.
#[cfg(test)]
pub(crate) fn env_lock() -> parking_lot::MutexGuard<'static, ()> {
    static LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());
    LOCK.lock()
}
