//! Engine-side table read seam.

use crate::{Dataset, EngineResult, Record};
use gridlink_types::ScanConfig;

/// Engine entry point for turning a scan configuration into a dataset.
///
/// The broker builds the [`ScanConfig`] (address, table, projection) and the
/// adapter plans the read with engine-native machinery: partition placement,
/// predicate pushdown, and whatever row representation the engine scans
/// into.
pub trait TableReadAdapter {
    /// The row type the engine scans into.
    type Row: Record;

    /// The dataset type produced by a read.
    type Output: Dataset<Self::Row>;

    /// Plan and start a table read.
    fn read_table(&self, config: ScanConfig) -> EngineResult<Self::Output>;
}
