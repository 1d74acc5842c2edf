//! Connection-lifecycle broker between distributed jobs and a clustered
//! storage service.
//!
//! A [`DistributedContext`] is built once on the job driver and shipped to
//! workers. It carries only the cluster address, a connector, and a
//! cancellation token; client handles are constructed lazily on each worker
//! by a shared [`ClientCache`] and reused across every partition the worker
//! processes.
//!
//! # Example
//!
//! ```ignore
//! use gridlink::{ContextBuilder, ContextResult};
//!
//! let context = ContextBuilder::new(connector)
//!     .master_addr("grid-master:7051")
//!     .build()?;
//!
//! // Write every element of every partition through the shared client.
//! context.for_each_partition(dataset, |records, sync, _asynchronous| {
//!     for record in records {
//!         sync.insert("facts", record)?;
//!     }
//!     Ok(())
//! })?;
//! ```
//!
//! # Crate Layout
//!
//! - [`gridlink_types`]: address and scan-configuration types
//! - [`gridlink_client`]: client contract and the per-process cache
//! - [`gridlink_engine`]: execution-engine seam (datasets, streams, reads)
//! - this crate: the context, its builder, the partition runner, per-record
//!   scan mapping, and the latest-context registry

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use gridlink_client::{self, ClientCache, ClientConnect, ClientError, ScanCursor};
pub use gridlink_engine::{
    self, BroadcastRef, Dataset, EngineError, MicroBatchStream, PartitionIter, Record,
    TableReadAdapter, micro_batch_channel,
};
pub use gridlink_types::{ClusterAddr, InvalidClusterAddr, ScanConfig};

pub mod config;

mod error;
pub use error::{ContextError, ContextResult};

mod registry;
pub use registry::ContextRegistry;

mod runner;
pub use runner::{PartitionRunner, UserIter};

mod scan_map;
pub use scan_map::{ScanFlatten, ScanMapper};

mod context;
pub use context::DistributedContext;

mod builder;
pub use builder::ContextBuilder;
