//! In-memory search backend for tests.
//!
//! Holds a fixed document set and emulates sliced scrolls: a document with
//! `_id` belongs to slice `hash(_id) % max`, and pages are served `size` hits
//! at a time.

use super::registry::ClientRegistry;
use super::types::{
    BoxFuture, Document, Hits, SearchClient, SearchRequest, SearchResponse, ShardStats,
};

use anyhow::Result;
use dashmap::{DashMap, DashSet};
use serde_json::{Map, Value, json};
use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const FAKE_CLIENT_TYPE: &str = "fake";

/// Deterministic slice assignment shared by the fake backends.
pub(crate) fn slice_of(doc_id: &str, max: u32) -> u32 {
    let mut hasher = DefaultHasher::new();
    doc_id.hash(&mut hasher);
    (hasher.finish() % max as u64) as u32
}

/// Documents `doc-0` .. `doc-{count-1}`.
pub(crate) fn numbered_documents(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| json!({ "_id": format!("doc-{}", i), "_source": { "n": i } }))
        .collect()
}

/// Keeps the documents of the slice named in `body`, or all of them.
pub(crate) fn filter_slice(documents: &[Document], body: &Map<String, Value>) -> Vec<Document> {
    let slice = body.get("slice").and_then(|slice| {
        let id = slice.get("id")?.as_u64()?;
        let max = slice.get("max")?.as_u64()?;
        Some((id as u32, max as u32))
    });

    documents
        .iter()
        .filter(|doc| match slice {
            Some((id, max)) => {
                let doc_id = doc["_id"].as_str().unwrap_or_default();
                slice_of(doc_id, max) == id
            }
            None => true,
        })
        .cloned()
        .collect()
}

#[derive(Default)]
struct FakeState {
    documents: Vec<Document>,
    failing_slices: DashSet<u32>,
    open_scrolls: DashMap<String, VecDeque<Vec<Document>>>,
    next_scroll: AtomicUsize,
    connections: AtomicUsize,
    cleared: AtomicUsize,
    bodies: Mutex<Vec<Map<String, Value>>>,
}

/// A cheap-to-clone handle on a shared fake backend.
#[derive(Clone, Default)]
pub(crate) struct FakeSearchClient {
    state: Arc<FakeState>,
}

impl FakeSearchClient {
    pub(crate) fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            state: Arc::new(FakeState {
                documents,
                ..FakeState::default()
            }),
        }
    }

    /// Makes every search for `slice_id` fail like a refused connection.
    pub(crate) fn fail_slice(&self, slice_id: u32) {
        self.state.failing_slices.insert(slice_id);
    }

    /// Called by the registry factory; counts client constructions.
    pub(crate) fn connect(&self) -> Self {
        self.state.connections.fetch_add(1, Ordering::SeqCst);
        self.clone()
    }

    pub(crate) fn connections(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    pub(crate) fn cleared_scrolls(&self) -> usize {
        self.state.cleared.load(Ordering::SeqCst)
    }

    pub(crate) fn open_scrolls(&self) -> usize {
        self.state.open_scrolls.len()
    }

    /// Request bodies received by `search`, in arrival order.
    pub(crate) fn bodies(&self) -> Vec<Map<String, Value>> {
        self.state.bodies.lock().unwrap().clone()
    }

    /// A registry with this backend registered as the "fake" client type.
    pub(crate) fn registry(&self) -> Arc<ClientRegistry> {
        let registry = ClientRegistry::new();
        let backend = self.clone();
        registry.register(FAKE_CLIENT_TYPE, move |_params| Ok(backend.connect()));
        registry
    }

    fn page(pages: &mut VecDeque<Vec<Document>>, scroll_id: &str) -> SearchResponse {
        SearchResponse {
            scroll_id: Some(scroll_id.to_string()),
            shards: ShardStats {
                total: 1,
                successful: 1,
                skipped: 0,
                failed: 0,
            },
            hits: Hits {
                hits: pages.pop_front().unwrap_or_default(),
            },
        }
    }

    async fn search_impl(&self, request: SearchRequest) -> Result<SearchResponse> {
        self.state.bodies.lock().unwrap().push(request.body.clone());

        if let Some(id) = request
            .body
            .get("slice")
            .and_then(|slice| slice.get("id"))
            .and_then(Value::as_u64)
        {
            if self.state.failing_slices.contains(&(id as u32)) {
                return Err(anyhow::anyhow!("connection refused while scanning slice {}", id));
            }
        }

        let matching = filter_slice(&self.state.documents, &request.body);
        let mut pages: VecDeque<Vec<Document>> = matching
            .chunks(request.size.max(1) as usize)
            .map(|chunk| chunk.to_vec())
            .collect();

        let scroll_id = format!(
            "scroll-{}",
            self.state.next_scroll.fetch_add(1, Ordering::SeqCst)
        );
        let response = Self::page(&mut pages, &scroll_id);
        self.state.open_scrolls.insert(scroll_id, pages);
        Ok(response)
    }

    async fn scroll_impl(&self, scroll_id: &str) -> Result<SearchResponse> {
        match self.state.open_scrolls.get_mut(scroll_id) {
            Some(mut pages) => Ok(Self::page(&mut pages, scroll_id)),
            None => Err(anyhow::anyhow!("scroll {} expired", scroll_id)),
        }
    }

    async fn clear_scroll_impl(&self, scroll_ids: &[String]) -> Result<()> {
        for id in scroll_ids {
            if self.state.open_scrolls.remove(id).is_some() {
                self.state.cleared.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }
}

impl SearchClient for FakeSearchClient {
    fn search(&self, request: SearchRequest) -> BoxFuture<'_, Result<SearchResponse>> {
        Box::pin(self.search_impl(request))
    }

    fn scroll<'a>(
        &'a self,
        scroll_id: &'a str,
        _keep_alive: &'a str,
        _timeout: Option<Duration>,
    ) -> BoxFuture<'a, Result<SearchResponse>> {
        Box::pin(self.scroll_impl(scroll_id))
    }

    fn clear_scroll<'a>(&'a self, scroll_ids: &'a [String]) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.clear_scroll_impl(scroll_ids))
    }
}
