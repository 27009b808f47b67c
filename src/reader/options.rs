//! Read options
//!
//! Builder-style configuration for [`read_search`](super::builder::read_search).

use super::types::{ClientConfig, ScanParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Partition count used when the caller does not choose one.
pub const DEFAULT_NPARTITIONS: u32 = 8;

/// Everything `read_search` needs besides the query itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Number of scroll slices, and therefore scan units.
    pub npartitions: u32,
    /// How each unit builds its client.
    pub client: ClientConfig,
    /// Parameters forwarded to every partition's scan.
    pub params: ScanParams,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            npartitions: DEFAULT_NPARTITIONS,
            client: ClientConfig::default(),
            params: ScanParams::new(),
        }
    }
}

impl ReadOptions {
    /// Create read options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of partitions
    pub fn npartitions(mut self, npartitions: u32) -> Self {
        self.npartitions = npartitions;
        self
    }

    /// Set the client recipe
    pub fn client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Set the index (or comma separated indices) to scan
    pub fn index(self, index: impl Into<String>) -> Self {
        self.param("index", index.into())
    }

    /// Set the legacy mapping type filter
    pub fn doc_type(self, doc_type: impl Into<String>) -> Self {
        self.param("doc_type", doc_type.into())
    }

    /// Set the scroll keep-alive (e.g., "5m")
    pub fn scroll(self, scroll: impl Into<String>) -> Self {
        self.param("scroll", scroll.into())
    }

    /// Set the page size of each scroll request
    pub fn size(self, size: u64) -> Self {
        self.param("size", size)
    }

    /// Add an arbitrary scan parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}
