use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A boxed, sendable future. Keeps `SearchClient` object safe so the
/// registry can hand out `Arc<dyn SearchClient>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A raw hit as returned by the backend. Never interpreted by the reader.
pub type Document = Value;

/// The first request of a scroll.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Comma separated index list. `None` searches every index.
    pub index: Option<String>,
    /// Legacy mapping type filter.
    pub doc_type: Option<String>,
    /// Request body: the query DSL with `sort` and `slice` already applied.
    pub body: Map<String, Value>,
    /// How long the backend keeps the scroll context alive (e.g., "5m").
    pub scroll: String,
    /// Hits per page.
    pub size: u64,
    /// Per-request timeout.
    pub request_timeout: Option<Duration>,
    /// Extra URL query parameters forwarded verbatim.
    pub extra: Vec<(String, String)>,
}

/// Shard accounting attached to every search/scroll response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShardStats {
    pub total: u64,
    pub successful: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl ShardStats {
    /// True when every shard either answered or was skipped.
    pub fn is_complete(&self) -> bool {
        self.successful.saturating_add(self.skipped) >= self.total
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Hits {
    pub hits: Vec<Document>,
}

/// One page of a scroll.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "_scroll_id", default, skip_serializing_if = "Option::is_none")]
    pub scroll_id: Option<String>,
    #[serde(rename = "_shards", default)]
    pub shards: ShardStats,
    #[serde(default)]
    pub hits: Hits,
}

/// The scroll primitives a backend must offer.
pub trait SearchClient: Send + Sync {
    /// Opens a scroll and returns its first page.
    fn search(&self, request: SearchRequest) -> BoxFuture<'_, Result<SearchResponse>>;

    /// Fetches the next page of an open scroll.
    fn scroll<'a>(
        &'a self,
        scroll_id: &'a str,
        keep_alive: &'a str,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, Result<SearchResponse>>;

    /// Releases scroll contexts on the backend.
    fn clear_scroll<'a>(&'a self, scroll_ids: &'a [String]) -> BoxFuture<'a, Result<()>>;
}
