//! Context builder for programmatic and environment-based configuration.
//!
//! # Examples
//!
//! ## Programmatic
//!
//! ```ignore
//! use gridlink::ContextBuilder;
//!
//! let context = ContextBuilder::new(connector)
//!     .master_addr("grid-master-a:7051,grid-master-b:7051")
//!     .build()?;
//! ```
//!
//! ## From Environment
//!
//! ```ignore
//! use gridlink::ContextBuilder;
//!
//! // Reads GRIDLINK_MASTER_ADDR
//! let context = ContextBuilder::from_env(connector)?.build()?;
//! ```

use crate::{
    ContextResult, DistributedContext,
    config::{self, ConfigError},
    registry::ContextRegistry,
};
use gridlink_client::{ClientCache, ClientConnect};
use gridlink_engine::BroadcastRef;
use gridlink_types::ClusterAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Builder for a [`DistributedContext`].
///
/// Building never connects to the cluster; the first partition body that
/// requests a client does. The built context is wrapped in an [`Arc`] and
/// registered as the latest context, replacing any previous registration.
#[derive(Debug)]
pub struct ContextBuilder<C> {
    connector: C,
    master_addr: Option<ClusterAddr>,
    cancel_token: Option<CancellationToken>,
}

impl<C: ClientConnect> ContextBuilder<C> {
    /// Create a builder around a client connector.
    ///
    /// Use the setter methods to configure the builder, then call
    /// [`build`](Self::build) to instantiate the context.
    pub const fn new(connector: C) -> Self {
        Self { connector, master_addr: None, cancel_token: None }
    }

    /// Create a builder from environment variables.
    ///
    /// Reads configuration from:
    /// - `GRIDLINK_MASTER_ADDR`: comma-separated coordinator addresses
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is missing or invalid.
    pub fn from_env(connector: C) -> Result<Self, ConfigError> {
        let addr = config::master_addr_from_env()?;
        Ok(Self::new(connector).master_addr(addr))
    }

    /// Set the cluster coordinator addresses.
    #[must_use]
    pub fn master_addr(mut self, addr: impl Into<ClusterAddr>) -> Self {
        self.master_addr = Some(addr.into());
        self
    }

    /// Set the cancellation token for streaming operations.
    ///
    /// If not set, a new token is created.
    #[must_use]
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Build the context and register it as the process-wide latest.
    ///
    /// # Errors
    ///
    /// Returns an error if no master address was configured.
    pub fn build(self) -> ContextResult<Arc<DistributedContext<C>>> {
        self.build_with_registry(ContextRegistry::global())
    }

    /// Build the context and register it in an explicit registry.
    pub fn build_with_registry(
        self,
        registry: &ContextRegistry,
    ) -> ContextResult<Arc<DistributedContext<C>>> {
        let addr = self.master_addr.ok_or(ConfigError::MissingMasterAddr)?;
        tracing::info!(%addr, "building distributed context");

        let cache = BroadcastRef::new(ClientCache::new(self.connector, addr.clone()));
        let cancel = self.cancel_token.unwrap_or_default();
        let context = Arc::new(DistributedContext::new(cache, cancel));

        registry.register(addr, context.clone());
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridlink_client::mem::{MemCluster, MemConnector};

    fn connector() -> MemConnector {
        MemConnector::new(MemCluster::new())
    }

    #[test]
    fn builder_requires_master_addr() {
        let result = ContextBuilder::new(connector()).build_with_registry(&ContextRegistry::new());
        assert!(result.is_err());
    }

    #[test]
    fn build_does_not_connect() {
        let cluster = MemCluster::new();
        let context = ContextBuilder::new(MemConnector::new(cluster.clone()))
            .master_addr("mem:7051")
            .build_with_registry(&ContextRegistry::new())
            .unwrap();

        assert_eq!(context.master_addr().as_str(), "mem:7051");
        assert_eq!(cluster.sync_connects(), 0);
        assert_eq!(cluster.async_connects(), 0);
    }

    #[test]
    fn build_registers_latest_context() {
        let registry = ContextRegistry::new();
        let _first = ContextBuilder::new(connector())
            .master_addr("a:7051")
            .build_with_registry(&registry)
            .unwrap();
        let second = ContextBuilder::new(connector())
            .master_addr("b:7051")
            .build_with_registry(&registry)
            .unwrap();

        assert_eq!(registry.latest_addr().unwrap().as_str(), "b:7051");
        let latest = registry.latest::<DistributedContext<MemConnector>>().unwrap();
        assert!(Arc::ptr_eq(&latest, &second));
    }

    #[test]
    fn from_env_reads_master_addr() {
        let _env = config::env_lock();
        // SAFETY: Test environment, env mutation serialized by env_lock
        unsafe {
            std::env::set_var(config::ENV_MASTER_ADDR, "env-master:7051");
        }
        let builder = ContextBuilder::from_env(connector()).unwrap();
        assert_eq!(builder.master_addr.as_ref().unwrap().as_str(), "env-master:7051");
        // SAFETY: Test environment, env mutation serialized by env_lock
        unsafe {
            std::env::remove_var(config::ENV_MASTER_ADDR);
        }
    }
}
