//! Execution-engine seam for distributed partition work.
//!
//! The broker layer does not run partitions itself; it hands partition
//! bodies to an engine through the traits in this crate. An engine supplies:
//!
//! - [`Dataset`]: a partitioned collection that can run a body over every
//!   partition, or map partitions into a derived dataset
//! - [`BroadcastRef`]: a handle to a value shipped once per worker rather
//!   than once per task
//! - [`MicroBatchStream`]: a stream of datasets arriving as micro-batches
//! - [`TableReadAdapter`]: the engine-side entry point for turning a scan
//!   configuration into an engine-native dataset
//!
//! # Feature Flags
//!
//! - **`local`**: enables the [`local`] in-process engine, which runs each
//!   partition on its own OS thread. Intended for tests and development.

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

mod error;
pub use error::{EngineError, EngineResult};

mod dataset;
pub use dataset::{Dataset, FalliblePartitionIter, PartitionIter, Record};

mod broadcast;
pub use broadcast::BroadcastRef;

mod stream;
pub use stream::{MicroBatchStream, micro_batch_channel};

mod read;
pub use read::TableReadAdapter;

#[cfg(any(test, feature = "local"))]
pub mod local;
