//! The distributed context.

use crate::{
    ContextResult,
    runner::{PartitionRunner, UserIter},
};
use gridlink_client::{ClientCache, ClientConnect};
use gridlink_engine::{
    BroadcastRef, Dataset, MicroBatchStream, PartitionIter, Record, TableReadAdapter,
};
use gridlink_types::{ClusterAddr, ScanConfig};
use std::sync::Arc;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

/// Broker between a distributed job and one storage cluster.
///
/// Serializable in spirit: a context carries only the cluster address, the
/// connector, and a cancellation token. Client handles never travel with it;
/// each worker's [`ClientCache`] builds them locally on first use.
///
/// Batch operations run partition bodies over a [`Dataset`]; streaming
/// operations drain a [`MicroBatchStream`] and run the same bodies over each
/// arriving batch, stopping at the cancellation token between batches.
pub struct DistributedContext<C: ClientConnect> {
    cache: BroadcastRef<ClientCache<C>>,
    cancel: CancellationToken,
}

impl<C: ClientConnect> core::fmt::Debug for DistributedContext<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DistributedContext")
            .field("master_addr", self.master_addr())
            .finish_non_exhaustive()
    }
}

impl<C: ClientConnect> DistributedContext<C> {
    pub(crate) const fn new(
        cache: BroadcastRef<ClientCache<C>>,
        cancel: CancellationToken,
    ) -> Self {
        Self { cache, cancel }
    }

    /// The cluster coordinator addresses this context connects to.
    pub fn master_addr(&self) -> &ClusterAddr {
        self.cache.value().addr()
    }

    /// The worker-shared client cache.
    pub const fn client_cache(&self) -> &BroadcastRef<ClientCache<C>> {
        &self.cache
    }

    /// The token that stops streaming operations.
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn runner(&self) -> PartitionRunner<C> {
        PartitionRunner::new(self.cache.clone())
    }

    /// Run `body` once per partition of `dataset`, discarding any output.
    ///
    /// Returns the first error any partition body produced, in partition
    /// order.
    pub fn for_each_partition<T, D, F>(&self, dataset: D, body: F) -> ContextResult<()>
    where
        T: Record,
        D: Dataset<T>,
        F: Fn(PartitionIter<T>, Arc<C::SyncClient>, Arc<C::AsyncClient>) -> ContextResult<()>
            + Send
            + Sync
            + Clone
            + 'static,
    {
        self.runner().run_for_each(dataset, body)
    }

    /// Run `body` once per partition of `dataset`, collecting its records
    /// into a derived dataset with the same partitioning.
    pub fn map_partitions<T, U, D, F>(&self, dataset: D, body: F) -> ContextResult<D::Mapped<U>>
    where
        T: Record,
        U: Record,
        D: Dataset<T>,
        F: Fn(
                PartitionIter<T>,
                Arc<C::SyncClient>,
                Arc<C::AsyncClient>,
            ) -> ContextResult<UserIter<U>>
            + Send
            + Sync
            + Clone
            + 'static,
    {
        self.runner().run_map(dataset, body)
    }

    /// Run `body` over every partition of every batch of a micro-batch
    /// stream, in arrival order.
    ///
    /// Returns when the stream ends or the context's cancellation token
    /// fires. Cancellation is observed between batches; a batch already
    /// running completes.
    pub async fn stream_for_each_partition<T, D, F>(
        &self,
        mut batches: MicroBatchStream<D>,
        body: F,
    ) -> ContextResult<()>
    where
        T: Record,
        D: Dataset<T>,
        F: Fn(PartitionIter<T>, Arc<C::SyncClient>, Arc<C::AsyncClient>) -> ContextResult<()>
            + Send
            + Sync
            + Clone
            + 'static,
    {
        let runner = self.runner();
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::info!(addr = %self.master_addr(), "streaming for-each cancelled");
                    return Ok(());
                }
                batch = batches.next() => {
                    let Some(dataset) = batch else { return Ok(()) };
                    runner.run_for_each(dataset, body.clone())?;
                }
            }
        }
    }

    /// Map every batch of a micro-batch stream through `body`, yielding one
    /// derived dataset per input batch, in arrival order.
    ///
    /// The returned stream ends when the input stream ends or the context's
    /// cancellation token fires, whichever comes first. A failed batch
    /// yields its error as an item; consumers decide whether to stop.
    pub fn stream_map_partitions<T, U, D, F>(
        &self,
        batches: MicroBatchStream<D>,
        body: F,
    ) -> impl Stream<Item = ContextResult<D::Mapped<U>>> + Send + use<C, T, U, D, F>
    where
        T: Record,
        U: Record,
        D: Dataset<T>,
        F: Fn(
                PartitionIter<T>,
                Arc<C::SyncClient>,
                Arc<C::AsyncClient>,
            ) -> ContextResult<UserIter<U>>
            + Send
            + Sync
            + Clone
            + 'static,
    {
        let runner = self.runner();
        let cancel = self.cancel.clone();
        batches
            .take_while(move |_| !cancel.is_cancelled())
            .map(move |dataset| runner.run_map(dataset, body.clone()))
    }

    /// Read a whole table into an engine dataset.
    pub fn read_table<A>(&self, adapter: &A, table: impl Into<String>) -> ContextResult<A::Output>
    where
        A: TableReadAdapter,
    {
        self.read_table_with(adapter, ScanConfig::new(self.master_addr().clone(), table))
    }

    /// Read a table into an engine dataset with an explicit configuration.
    pub fn read_table_with<A>(&self, adapter: &A, config: ScanConfig) -> ContextResult<A::Output>
    where
        A: TableReadAdapter,
    {
        tracing::debug!(addr = %config.master_address, table = %config.table_name, "reading table");
        adapter.read_table(config).map_err(Into::into)
    }
}
