//! In-memory storage cluster for testing.
//!
//! This backend stores tables in memory using standard Rust collections and
//! counts client constructions, so tests can assert that the cache builds
//! each handle kind exactly once per process. It also supports fault
//! injection for connection and scan-pull failures.

use crate::{ClientConnect, ClientError, ClientResult, ScanCursor};
use gridlink_types::{ClusterAddr, ScanConfig};
use parking_lot::{Mutex, RwLock};
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

/// The next connection attempt was set up to fail.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("connection refused by in-memory cluster")]
pub struct ConnectRefused;

/// A scan pull was set up to fail.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("scan pull failed in in-memory cluster")]
pub struct PullFailed;

/// The scanned table does not exist.
#[derive(Debug, thiserror::Error)]
#[error("no such table: {0}")]
pub struct NoSuchTable(pub String);

/// A row in an in-memory table, stored as named string columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemRow {
    columns: Vec<(String, String)>,
}

impl MemRow {
    /// Create a row from `(column, value)` pairs.
    pub fn new(columns: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self { columns: columns.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    /// Look up a column value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Restrict the row to the named columns, preserving their order.
    fn project(&self, projection: &[String]) -> Self {
        Self {
            columns: projection
                .iter()
                .filter_map(|name| {
                    self.get(name).map(|v| (name.clone(), v.to_owned()))
                })
                .collect(),
        }
    }
}

/// Inner cluster state.
#[derive(Default)]
struct MemClusterInner {
    tables: HashMap<String, Vec<MemRow>>,
}

/// An in-memory storage cluster.
///
/// Thread-safe and cheap to share; [`MemConnector`] hands out client handles
/// backed by the same cluster, so writes from any handle are visible to
/// every other handle and to test assertions.
pub struct MemCluster {
    inner: RwLock<MemClusterInner>,
    sync_connects: AtomicUsize,
    async_connects: AtomicUsize,
    fail_connects: AtomicUsize,
    fail_scan_pull: Mutex<Option<usize>>,
    batch_size: AtomicUsize,
}

impl std::fmt::Debug for MemCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemCluster").finish_non_exhaustive()
    }
}

impl MemCluster {
    /// Create a new empty cluster.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::default(),
            sync_connects: AtomicUsize::new(0),
            async_connects: AtomicUsize::new(0),
            fail_connects: AtomicUsize::new(0),
            fail_scan_pull: Mutex::new(None),
            batch_size: AtomicUsize::new(2),
        })
    }

    /// Create an empty table, replacing any existing contents.
    pub fn create_table(&self, name: impl Into<String>) {
        self.inner.write().tables.insert(name.into(), Vec::new());
    }

    /// Create a table pre-populated with `rows`.
    pub fn create_table_with(&self, name: impl Into<String>, rows: Vec<MemRow>) {
        self.inner.write().tables.insert(name.into(), rows);
    }

    /// Snapshot the rows of a table, if it exists.
    pub fn table_rows(&self, name: &str) -> Option<Vec<MemRow>> {
        self.inner.read().tables.get(name).cloned()
    }

    /// How many synchronous clients have been successfully constructed.
    pub fn sync_connects(&self) -> usize {
        self.sync_connects.load(Ordering::SeqCst)
    }

    /// How many asynchronous clients have been successfully constructed.
    pub fn async_connects(&self) -> usize {
        self.async_connects.load(Ordering::SeqCst)
    }

    /// Make the next `n` connection attempts (of either kind) fail.
    pub fn fail_next_connects(&self, n: usize) {
        self.fail_connects.store(n, Ordering::SeqCst);
    }

    /// Make pull number `n` (zero-based) of the next opened scanner fail.
    pub fn fail_scan_pull(&self, n: usize) {
        *self.fail_scan_pull.lock() = Some(n);
    }

    /// Set the number of rows per scan batch.
    pub fn set_batch_size(&self, rows: usize) {
        self.batch_size.store(rows.max(1), Ordering::SeqCst);
    }

    fn check_connect(&self) -> Result<(), ConnectRefused> {
        let res = self.fail_connects.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            n.checked_sub(1)
        });
        if res.is_ok() { Err(ConnectRefused) } else { Ok(()) }
    }

    fn insert(&self, table: &str, row: MemRow) -> Result<(), NoSuchTable> {
        let mut inner = self.inner.write();
        let Some(rows) = inner.tables.get_mut(table) else {
            return Err(NoSuchTable(table.to_owned()));
        };
        rows.push(row);
        Ok(())
    }

    fn scan(&self, config: &ScanConfig) -> Result<MemScanCursor, NoSuchTable> {
        let rows = self
            .table_rows(&config.table_name)
            .ok_or_else(|| NoSuchTable(config.table_name.clone()))?;
        let rows: Vec<MemRow> = match &config.column_projection {
            Some(projection) => rows.iter().map(|r| r.project(projection)).collect(),
            None => rows,
        };
        let batch_size = self.batch_size.load(Ordering::SeqCst);
        let batches = rows.chunks(batch_size).map(<[MemRow]>::to_vec).collect();
        Ok(MemScanCursor { batches, pulls: 0, fail_on_pull: self.fail_scan_pull.lock().take() })
    }
}

/// Connector producing client handles backed by a shared [`MemCluster`].
#[derive(Debug, Clone)]
pub struct MemConnector {
    cluster: Arc<MemCluster>,
}

impl MemConnector {
    /// Create a connector for `cluster`.
    pub const fn new(cluster: Arc<MemCluster>) -> Self {
        Self { cluster }
    }
}

impl ClientConnect for MemConnector {
    type SyncClient = MemSyncClient;
    type AsyncClient = MemAsyncClient;

    fn connect_sync(&self, addr: &ClusterAddr) -> ClientResult<Self::SyncClient> {
        self.cluster
            .check_connect()
            .map_err(|err| ClientError::connection(addr.clone(), err))?;
        self.cluster.sync_connects.fetch_add(1, Ordering::SeqCst);
        Ok(MemSyncClient { cluster: self.cluster.clone() })
    }

    fn connect_async(&self, addr: &ClusterAddr) -> ClientResult<Self::AsyncClient> {
        self.cluster
            .check_connect()
            .map_err(|err| ClientError::connection(addr.clone(), err))?;
        self.cluster.async_connects.fetch_add(1, Ordering::SeqCst);
        Ok(MemAsyncClient { cluster: self.cluster.clone() })
    }
}

/// Synchronous client handle for an in-memory cluster.
#[derive(Debug)]
pub struct MemSyncClient {
    cluster: Arc<MemCluster>,
}

impl MemSyncClient {
    /// Insert a row into a table.
    pub fn insert(&self, table: &str, row: MemRow) -> ClientResult<()> {
        self.cluster.insert(table, row).map_err(ClientError::scan)
    }

    /// Open a scan cursor for the table named by `config`.
    pub fn open_scanner(&self, config: &ScanConfig) -> ClientResult<MemScanCursor> {
        self.cluster.scan(config).map_err(ClientError::scan)
    }
}

/// Asynchronous client handle for an in-memory cluster.
#[derive(Debug)]
pub struct MemAsyncClient {
    cluster: Arc<MemCluster>,
}

impl MemAsyncClient {
    /// Insert a row into a table.
    pub async fn insert(&self, table: &str, row: MemRow) -> ClientResult<()> {
        self.cluster.insert(table, row).map_err(ClientError::scan)
    }

    /// Count the rows of a table.
    pub async fn count_rows(&self, table: &str) -> ClientResult<usize> {
        self.cluster
            .table_rows(table)
            .map(|rows| rows.len())
            .ok_or_else(|| ClientError::scan(NoSuchTable(table.to_owned())))
    }
}

/// Batch-pull cursor over one in-memory table scan.
#[derive(Debug)]
pub struct MemScanCursor {
    batches: VecDeque<Vec<MemRow>>,
    pulls: usize,
    fail_on_pull: Option<usize>,
}

impl ScanCursor for MemScanCursor {
    type Batch = Vec<MemRow>;

    fn has_more_rows(&self) -> bool {
        !self.batches.is_empty()
    }

    fn next_batch(&mut self) -> ClientResult<Self::Batch> {
        let pull = self.pulls;
        self.pulls += 1;
        if self.fail_on_pull == Some(pull) {
            return Err(ClientError::scan(PullFailed));
        }
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}
