//! Partition runner bridging user bodies to the engine.

use crate::{ContextError, ContextResult};
use gridlink_client::{ClientCache, ClientConnect};
use gridlink_engine::{
    BroadcastRef, Dataset, EngineError, FalliblePartitionIter, PartitionIter, Record,
};
use std::sync::Arc;

/// The records a mapping partition body yields.
///
/// Per-record results, so an error in the middle of a partition surfaces at
/// the record that caused it.
pub type UserIter<U> = Box<dyn Iterator<Item = ContextResult<U>> + Send>;

/// Runs user partition bodies on an engine.
///
/// For each partition, the runner resolves both client handles from the
/// worker's cache and invokes the body as `body(records, sync, async)`. The
/// cache travels as a [`BroadcastRef`], so a distributed engine ships it
/// once per worker rather than once per partition. Client-resolution
/// failures surface as that partition's error; there is no local retry,
/// the engine's own task-retry mechanism decides whether to re-run.
pub struct PartitionRunner<C: ClientConnect> {
    cache: BroadcastRef<ClientCache<C>>,
}

impl<C: ClientConnect> Clone for PartitionRunner<C> {
    fn clone(&self) -> Self {
        Self { cache: self.cache.clone() }
    }
}

impl<C: ClientConnect> core::fmt::Debug for PartitionRunner<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PartitionRunner").field("cache", self.cache.value()).finish()
    }
}

impl<C: ClientConnect> PartitionRunner<C> {
    /// Create a runner over a broadcast client cache.
    pub const fn new(cache: BroadcastRef<ClientCache<C>>) -> Self {
        Self { cache }
    }

    /// The broadcast client cache this runner resolves handles from.
    pub const fn cache(&self) -> &BroadcastRef<ClientCache<C>> {
        &self.cache
    }

    /// Run `body` once per partition of `dataset`, discarding output.
    pub fn run_for_each<T, D, F>(&self, dataset: D, body: F) -> ContextResult<()>
    where
        T: Record,
        D: Dataset<T>,
        F: Fn(PartitionIter<T>, Arc<C::SyncClient>, Arc<C::AsyncClient>) -> ContextResult<()>
            + Send
            + Sync
            + Clone
            + 'static,
    {
        let cache = self.cache.clone();
        dataset
            .for_each_partition(move |records| {
                let (sync, asynchronous) = resolve(cache.value())?;
                body(records, sync, asynchronous).map_err(EngineError::task)
            })
            .map_err(ContextError::from)
    }

    /// Run `body` once per partition of `dataset`, collecting its records
    /// into a derived dataset with the same partitioning.
    ///
    /// The body's output iterator is consumed lazily by the engine; nothing
    /// is materialized here.
    pub fn run_map<T, U, D, F>(&self, dataset: D, body: F) -> ContextResult<D::Mapped<U>>
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
        let cache = self.cache.clone();
        dataset
            .map_partitions(move |records| {
                let out = resolve(cache.value())
                    .map_err(ContextError::from)
                    .and_then(|(sync, asynchronous)| body(records, sync, asynchronous));
                match out {
                    Ok(records) => Box::new(records.map(|r| r.map_err(EngineError::task)))
                        as FalliblePartitionIter<U>,
                    Err(err) => Box::new(std::iter::once(Err(EngineError::task(err))))
                        as FalliblePartitionIter<U>,
                }
            })
            .map_err(ContextError::from)
    }
}

/// Resolve both handle kinds for one partition.
fn resolve<C: ClientConnect>(
    cache: &ClientCache<C>,
) -> Result<(Arc<C::SyncClient>, Arc<C::AsyncClient>), EngineError> {
    let sync = cache.sync_client().map_err(EngineError::task)?;
    let asynchronous = cache.async_client().map_err(EngineError::task)?;
    Ok((sync, asynchronous))
}
