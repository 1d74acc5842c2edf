//! Types shared by the gridlink crates.
//!
//! These are the low-level types that cross crate boundaries: the cluster
//! coordinator address broadcast from the driving process to every worker,
//! and the scan configuration handed to the execution engine's native-input
//! adapter for full-table reads.

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

mod addr;
pub use addr::{ClusterAddr, InvalidClusterAddr};

mod scan_config;
pub use scan_config::ScanConfig;
