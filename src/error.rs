//! Error types for reader operations
//!
//! Build-time validation problems are reported as [`ReadError`] before any
//! scan unit exists. Everything that goes wrong while a unit runs is a
//! [`ScanError`], wrapped in a [`PartitionError`] that names the slice.

use crate::reader::types::{SliceDescriptor, UnitId};
use thiserror::Error;

/// Errors raised synchronously by the partitioned scan builder.
#[derive(Debug, Error)]
pub enum ReadError {
    /// `npartitions` must be positive.
    #[error("npartitions must be at least 1, got {0}")]
    InvalidPartitionCount(u32),

    /// The caller's query already carries a `slice` key.
    #[error("query already contains a `slice` key; slices are assigned per partition")]
    SliceConflict,

    /// A scan parameter tried to override a key the builder owns.
    #[error("scan parameter `{0}` is managed by the reader and cannot be overridden")]
    ReservedParam(String),

    /// No client type was named in the client configuration.
    #[error("client type must not be empty")]
    InvalidClientType,

    /// A scan unit could not be encoded or decoded for transmission.
    #[error("scan unit serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures while executing a single scan against the backend.
#[derive(Debug, Error)]
pub enum ScanError {
    /// No factory is registered under the requested client type.
    #[error("unknown client type: {0}")]
    UnknownClientType(String),

    /// The factory rejected the client parameters.
    #[error("client construction failed: {0:#}")]
    Client(anyhow::Error),

    /// A search, scroll or transport call failed.
    #[error("search request failed: {0:#}")]
    Request(anyhow::Error),

    /// Some shards did not answer a scroll page.
    #[error(
        "scroll request hit shard failures: {successful} of {total} shards succeeded ({failed} failed)"
    )]
    ShardFailure {
        total: u64,
        successful: u64,
        skipped: u64,
        failed: u64,
    },

    /// A forwarded scan parameter has an unusable value.
    #[error("invalid scan parameter `{name}`: {reason}")]
    InvalidParam { name: String, reason: String },

    /// The task running the unit did not finish.
    #[error("scan task aborted: {0}")]
    Aborted(String),
}

/// A scan failure scoped to one partition.
#[derive(Debug, Error)]
#[error("partition slice {slice} (unit {unit}) failed: {source}")]
pub struct PartitionError {
    pub unit: UnitId,
    pub slice: SliceDescriptor,
    #[source]
    pub source: ScanError,
}

impl PartitionError {
    pub fn new(unit: UnitId, slice: SliceDescriptor, source: ScanError) -> Self {
        Self {
            unit,
            slice,
            source,
        }
    }
}
