//! Cluster coordinator address.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Address of the storage cluster's coordinator endpoint.
///
/// This is the only state transmitted from the driving process to worker
/// processes: it is broadcast once at context construction and read-only
/// thereafter. The string is opaque to gridlink; a comma-separated list of
/// coordinators is legal if the client library accepts one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterAddr(String);

impl ClusterAddr {
    /// Create a new cluster address from any string-like value.
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClusterAddr {
    fn from(addr: &str) -> Self {
        Self::new(addr)
    }
}

impl From<String> for ClusterAddr {
    fn from(addr: String) -> Self {
        Self(addr)
    }
}

impl FromStr for ClusterAddr {
    type Err = InvalidClusterAddr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(InvalidClusterAddr);
        }
        Ok(Self::new(s))
    }
}

/// Error returned when parsing an empty cluster address.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("cluster address must not be empty")]
pub struct InvalidClusterAddr;
