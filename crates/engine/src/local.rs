//! In-process engine for testing.
//!
//! Runs each partition body on its own OS thread over vectors held in
//! memory. Intended for tests and development; a production deployment
//! plugs a distributed engine into the same traits.

use crate::{
    Dataset, EngineError, EngineResult, FalliblePartitionIter, PartitionIter, Record,
    TableReadAdapter,
};
use gridlink_types::ScanConfig;
use parking_lot::Mutex;

/// An in-memory partitioned dataset.
///
/// Each inner vector is one partition. Partition bodies run concurrently,
/// one thread per partition, and results are gathered in partition order so
/// error reporting is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VecDataset<T> {
    partitions: Vec<Vec<T>>,
}

impl<T: Record> VecDataset<T> {
    /// Create a dataset from explicit partitions.
    pub fn new(partitions: Vec<Vec<T>>) -> Self {
        Self { partitions }
    }

    /// Create a dataset by chunking `elems` into `partitions` partitions.
    pub fn from_elems(elems: Vec<T>, partitions: usize) -> Self {
        let partitions = partitions.max(1);
        let chunk = elems.len().div_ceil(partitions).max(1);
        Self { partitions: elems.chunks(chunk).map(<[T]>::to_vec).collect() }
    }

    /// The partitions of this dataset.
    pub fn partitions(&self) -> &[Vec<T>] {
        &self.partitions
    }

    /// Flatten the dataset into its elements, in partition order.
    pub fn into_elements(self) -> Vec<T> {
        self.partitions.into_iter().flatten().collect()
    }
}

impl<T: Record> Dataset<T> for VecDataset<T> {
    type Mapped<U: Record> = VecDataset<U>;

    fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    fn for_each_partition<F>(self, body: F) -> EngineResult<()>
    where
        F: Fn(PartitionIter<T>) -> EngineResult<()> + Send + Sync + Clone + 'static,
    {
        tracing::debug!(partitions = self.partitions.len(), "running for-each over partitions");
        let results = run_partitions(self.partitions, move |iter| body(iter));
        results.into_iter().collect()
    }

    fn map_partitions<U, F>(self, body: F) -> EngineResult<Self::Mapped<U>>
    where
        U: Record,
        F: Fn(PartitionIter<T>) -> FalliblePartitionIter<U> + Send + Sync + Clone + 'static,
    {
        tracing::debug!(partitions = self.partitions.len(), "mapping partitions");
        let results = run_partitions(self.partitions, move |iter| body(iter).collect());
        let partitions = results.into_iter().collect::<EngineResult<_>>()?;
        Ok(VecDataset { partitions })
    }
}

/// Run `task` over each partition on its own thread, gathering per-partition
/// results in partition order. A panicking thread yields
/// [`EngineError::WorkerPanic`] for its slot.
fn run_partitions<T, R, F>(partitions: Vec<Vec<T>>, task: F) -> Vec<EngineResult<R>>
where
    T: Record,
    R: Send,
    F: Fn(PartitionIter<T>) -> EngineResult<R> + Send + Sync + Clone,
{
    std::thread::scope(|scope| {
        let handles: Vec<_> = partitions
            .into_iter()
            .map(|partition| {
                let task = task.clone();
                scope.spawn(move || task(Box::new(partition.into_iter())))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(Err(EngineError::WorkerPanic)))
            .collect()
    })
}

/// Read adapter serving canned partitions and recording the configuration of
/// the most recent read.
#[derive(Debug)]
pub struct MemReadAdapter<T> {
    partitions: Vec<Vec<T>>,
    last_config: Mutex<Option<ScanConfig>>,
}

impl<T: Record> MemReadAdapter<T> {
    /// Create an adapter that serves `partitions` for every read.
    pub fn new(partitions: Vec<Vec<T>>) -> Self {
        Self { partitions, last_config: Mutex::new(None) }
    }

    /// The configuration of the most recent read, if any.
    pub fn last_config(&self) -> Option<ScanConfig> {
        self.last_config.lock().clone()
    }
}

impl<T: Record> TableReadAdapter for MemReadAdapter<T> {
    type Row = T;
    type Output = VecDataset<T>;

    fn read_table(&self, config: ScanConfig) -> EngineResult<Self::Output> {
        tracing::debug!(table = %config.table_name, "planning in-memory table read");
        *self.last_config.lock() = Some(config);
        Ok(VecDataset::new(self.partitions.clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn dataset() -> VecDataset<u64> {
        VecDataset::new(vec![vec![1, 2], vec![3], vec![4, 5, 6]])
    }

    #[test]
    fn for_each_visits_every_element_once() {
        let sum = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let (s, c) = (sum.clone(), calls.clone());
        dataset()
            .for_each_partition(move |iter| {
                c.fetch_add(1, Ordering::SeqCst);
                s.fetch_add(iter.sum::<u64>() as usize, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        assert_eq!(sum.load(Ordering::SeqCst), 21);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn map_preserves_partitioning_and_order() {
        let mapped = dataset()
            .map_partitions(|iter| {
                Box::new(iter.map(|n| Ok(n * 10))) as FalliblePartitionIter<u64>
            })
            .unwrap();
        assert_eq!(mapped.partition_count(), 3);
        assert_eq!(mapped.into_elements(), vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn body_error_propagates() {
        #[derive(Debug, thiserror::Error)]
        #[error("bad partition")]
        struct BadPartition;

        let err = dataset()
            .for_each_partition(|iter| {
                if iter.count() == 1 {
                    return Err(EngineError::task(BadPartition));
                }
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "bad partition");
    }

    #[test]
    fn panicking_body_reports_worker_panic() {
        let err = dataset()
            .for_each_partition(|iter| {
                if iter.count() == 1 {
                    panic!("boom");
                }
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::WorkerPanic));
    }

    #[test]
    fn empty_dataset_runs_no_bodies() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        VecDataset::<u64>::new(Vec::new())
            .for_each_partition(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn from_elems_chunks_evenly() {
        let ds = VecDataset::from_elems((0..10).collect(), 3);
        assert_eq!(ds.partition_count(), 3);
        assert_eq!(ds.into_elements(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn read_adapter_records_config() {
        let adapter = MemReadAdapter::new(vec![vec![1u64, 2], vec![3]]);
        assert!(adapter.last_config().is_none());

        let ds = adapter.read_table(ScanConfig::new("host:7051", "orders")).unwrap();
        assert_eq!(ds.partition_count(), 2);
        let config = adapter.last_config().unwrap();
        assert_eq!(config.table_name, "orders");
        assert!(config.column_projection.is_none());
    }
}
