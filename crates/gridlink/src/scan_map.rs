//! Per-record scan mapping.
//!
//! Maps every record of a partition to its own table scan and flattens the
//! scanned batches into one output sequence. Scans are opened lazily, one at
//! a time, as the output is drained; a partition holds at most one open
//! cursor regardless of how many records it contains.

use crate::{ContextResult, runner::UserIter};
use gridlink_client::ScanCursor;
use gridlink_engine::PartitionIter;
use std::sync::Arc;

/// Maps each record of a partition to a table scan.
///
/// Built from two closures:
///
/// - `make_scanner` opens a cursor for one record, given both client handles
/// - `convert_batch` turns one pulled batch into zero or more output records
///
/// Use [`into_partition_fn`] to obtain a mapping partition body for
/// [`DistributedContext::map_partitions`], or [`flatten`] to drive a
/// partition against already-resolved clients directly.
///
/// [`into_partition_fn`]: ScanMapper::into_partition_fn
/// [`flatten`]: ScanMapper::flatten
/// [`DistributedContext::map_partitions`]: crate::DistributedContext::map_partitions
#[derive(Debug, Clone)]
pub struct ScanMapper<Mk, Cv> {
    make_scanner: Mk,
    convert_batch: Cv,
}

impl<Mk, Cv> ScanMapper<Mk, Cv> {
    /// Create a mapper from its two closures.
    pub const fn new(make_scanner: Mk, convert_batch: Cv) -> Self {
        Self { make_scanner, convert_batch }
    }

    /// Flatten one partition's records into scanned output records.
    pub fn flatten<T, Sy, As, S, I>(
        self,
        records: PartitionIter<T>,
        sync: Arc<Sy>,
        asynchronous: Arc<As>,
    ) -> ScanFlatten<T, Sy, As, S, I::IntoIter, Mk, Cv>
    where
        Mk: Fn(&T, &Sy, &As) -> ContextResult<S>,
        S: ScanCursor,
        Cv: Fn(S::Batch) -> I,
        I: IntoIterator,
    {
        ScanFlatten {
            records,
            sync,
            asynchronous,
            make_scanner: self.make_scanner,
            convert_batch: self.convert_batch,
            cursor: None,
            segment: None,
            done: false,
        }
    }

    /// Convert the mapper into a mapping partition body.
    ///
    /// The handle types are taken directly from `make_scanner`'s signature,
    /// so the body slots into
    /// [`DistributedContext::map_partitions`](crate::DistributedContext::map_partitions)
    /// without type annotations.
    pub fn into_partition_fn<T, Sy, As, S, I, U>(
        self,
    ) -> impl Fn(PartitionIter<T>, Arc<Sy>, Arc<As>) -> ContextResult<UserIter<U>>
    + Send
    + Sync
    + Clone
    + 'static
    where
        Mk: Fn(&T, &Sy, &As) -> ContextResult<S> + Clone + Send + Sync + 'static,
        Sy: Send + Sync + 'static,
        As: Send + Sync + 'static,
        S: ScanCursor + 'static,
        Cv: Fn(S::Batch) -> I + Clone + Send + Sync + 'static,
        I: IntoIterator<Item = U>,
        I::IntoIter: Send + 'static,
        T: Send + 'static,
        U: 'static,
    {
        move |records, sync, asynchronous| {
            Ok(Box::new(self.clone().flatten(records, sync, asynchronous)))
        }
    }
}

/// Lazy iterator over the scanned output of one partition.
///
/// Pulls the next source record only after the previous record's scan is
/// exhausted, and the next batch only after the previous batch's converted
/// segment is drained, so each record's output stays contiguous and in scan
/// order. Fuses after the first scanner-construction or pull error.
pub struct ScanFlatten<T, Sy, As, S, Seg, Mk, Cv> {
    records: PartitionIter<T>,
    sync: Arc<Sy>,
    asynchronous: Arc<As>,
    make_scanner: Mk,
    convert_batch: Cv,
    cursor: Option<S>,
    segment: Option<Seg>,
    done: bool,
}

impl<T, Sy, As, S, Seg, Mk, Cv> core::fmt::Debug for ScanFlatten<T, Sy, As, S, Seg, Mk, Cv> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScanFlatten")
            .field("scanning", &self.cursor.is_some())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T, Sy, As, S, I, Mk, Cv> Iterator for ScanFlatten<T, Sy, As, S, I::IntoIter, Mk, Cv>
where
    Mk: Fn(&T, &Sy, &As) -> ContextResult<S>,
    S: ScanCursor,
    Cv: Fn(S::Batch) -> I,
    I: IntoIterator,
{
    type Item = ContextResult<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(segment) = &mut self.segment {
                if let Some(out) = segment.next() {
                    return Some(Ok(out));
                }
                self.segment = None;
            }

            if let Some(cursor) = &mut self.cursor {
                if cursor.has_more_rows() {
                    match cursor.next_batch() {
                        Ok(batch) => {
                            self.segment = Some((self.convert_batch)(batch).into_iter());
                            continue;
                        }
                        Err(err) => {
                            self.done = true;
                            return Some(Err(err.into()));
                        }
                    }
                }
                self.cursor = None;
            }

            let Some(record) = self.records.next() else {
                self.done = true;
                return None;
            };
            match (self.make_scanner)(&record, &self.sync, &self.asynchronous) {
                Ok(cursor) => self.cursor = Some(cursor),
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
