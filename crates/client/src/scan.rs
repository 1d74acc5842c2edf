//! Remote scan cursor contract.

use crate::ClientResult;

/// A remote cursor over one table scan, drained in batch pulls.
///
/// Cursors are handed out by a connected client (one per scan) and pulled
/// until exhausted. A pull that fails leaves the cursor in an unspecified
/// state; callers must not pull it again.
pub trait ScanCursor: Send {
    /// The batch of rows produced by one pull.
    type Batch;

    /// Whether the cursor has more rows to pull.
    fn has_more_rows(&self) -> bool;

    /// Pull the next batch of rows from the cluster.
    ///
    /// Must only be called while [`has_more_rows`] returns `true`.
    ///
    /// [`has_more_rows`]: ScanCursor::has_more_rows
    fn next_batch(&mut self) -> ClientResult<Self::Batch>;
}
