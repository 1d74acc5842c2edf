//! Partitioned dataset contract.

use crate::EngineResult;

/// Marker for element types that can cross partition boundaries.
///
/// Blanket-implemented; engines move elements between workers, so they must
/// be `Send`, and derived datasets may re-read them, so they must be
/// `Clone`.
pub trait Record: Send + Clone + 'static {}

impl<T: Send + Clone + 'static> Record for T {}

/// The elements of one partition, handed to a partition body.
///
/// Boxed so engines with different storage layouts present a uniform
/// iterator to partition bodies.
pub type PartitionIter<T> = Box<dyn Iterator<Item = T> + Send>;

/// The fallible output of a mapping partition body.
///
/// Bodies yield per-record results so an error mid-partition surfaces where
/// it happened instead of discarding already-produced records silently.
pub type FalliblePartitionIter<U> = Box<dyn Iterator<Item = EngineResult<U>> + Send>;

/// A partitioned collection that an engine can run partition bodies over.
///
/// Partition bodies receive every element of exactly one partition and run
/// once per partition. Bodies must be `Clone` because the engine ships one
/// copy to each worker.
pub trait Dataset<T: Record>: Send + Sized {
    /// The dataset type produced by [`map_partitions`].
    ///
    /// [`map_partitions`]: Dataset::map_partitions
    type Mapped<U: Record>: Dataset<U>;

    /// The number of partitions in this dataset.
    fn partition_count(&self) -> usize;

    /// Run `body` once per partition, discarding any output.
    ///
    /// Returns the first error any partition body produced.
    fn for_each_partition<F>(self, body: F) -> EngineResult<()>
    where
        F: Fn(PartitionIter<T>) -> EngineResult<()> + Send + Sync + Clone + 'static;

    /// Run `body` once per partition, collecting its records into a derived
    /// dataset with the same partitioning.
    fn map_partitions<U, F>(self, body: F) -> EngineResult<Self::Mapped<U>>
    where
        U: Record,
        F: Fn(PartitionIter<T>) -> FalliblePartitionIter<U> + Send + Sync + Clone + 'static;
}
