//! Scan configuration for full-table reads.

use crate::ClusterAddr;
use serde::{Deserialize, Serialize};

/// Configuration handed to the execution engine's native-input adapter for a
/// full-table read.
///
/// The adapter owns partitioning and scan construction; gridlink only fills
/// in where to read from. Serialization exists because the configuration is
/// carried across the driver/worker boundary by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Coordinator address of the storage cluster to read from.
    pub master_address: ClusterAddr,
    /// Name of the table to scan.
    pub table_name: String,
    /// Optional column projection; `None` reads every column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_projection: Option<Vec<String>>,
}

impl ScanConfig {
    /// Create a configuration reading every column of `table_name`.
    pub fn new(master_address: impl Into<ClusterAddr>, table_name: impl Into<String>) -> Self {
        Self {
            master_address: master_address.into(),
            table_name: table_name.into(),
            column_projection: None,
        }
    }

    /// Restrict the scan to the named columns.
    #[must_use]
    pub fn with_projection(
        mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.column_projection = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}
