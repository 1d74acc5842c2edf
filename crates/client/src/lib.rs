//! Storage-cluster client contract and the per-process client cache.
//!
//! Distributed jobs that write to or scan an external storage cluster need a
//! connected client on every worker, but client construction is expensive
//! (it blocks on network I/O) and handles must be shared across all the
//! partitions a worker processes. This crate provides:
//!
//! - [`ClientConnect`]: the "build me a connected client given an address"
//!   seam implemented by the storage client library
//! - [`ScanCursor`]: the remote cursor contract drained in batch pulls
//! - [`ClientCache`]: a lock-protected, lazily-initialized, per-process
//!   cache holding at most one sync and one async client handle
//!
//! # Lifecycle
//!
//! Handles are constructed on first use and never closed by this crate; they
//! live until worker-process exit. A failed construction leaves the cache
//! empty so a later partition can retry; transient connection errors must
//! not permanently disable a worker.
//!
//! # Feature Flags
//!
//! - **`test-utils`**: enables the [`mem`] in-memory cluster backend with
//!   construction counters and fault injection.

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
pub use error::{ClientError, ClientResult};

mod connect;
pub use connect::ClientConnect;

mod scan;
pub use scan::ScanCursor;

mod cache;
pub use cache::ClientCache;

#[cfg(any(test, feature = "test-utils"))]
pub mod mem;
