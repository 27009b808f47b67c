//! Scroll Draining
//!
//! Opens a scroll with the partition's query and keeps requesting pages until
//! the backend returns an empty one. The whole slice is materialized in order.
//!
//! ## Recognised parameters
//! - `index`: string or list of strings.
//! - `doc_type`: legacy mapping type.
//! - `scroll`: scroll keep-alive, default `"5m"`.
//! - `size`: hits per page, default `1000`.
//! - `request_timeout`: seconds, applied to every search/scroll call.
//! - `raise_on_error`: fail on shard failures, default `true`.
//! - `clear_scroll`: release the scroll context when done, default `true`.
//! - `preserve_order`: accepted for compatibility; the reader manages `sort`.
//!
//! Any other key is forwarded to the search call as a URL query parameter.

use super::types::{Document, SearchClient, SearchRequest, SearchResponse, ShardStats};
use crate::error::ScanError;
use crate::reader::types::{Query, ScanParams};

use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_SCROLL: &str = "5m";
pub const DEFAULT_SIZE: u64 = 1000;

/// Scan parameters after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub index: Option<String>,
    pub doc_type: Option<String>,
    pub scroll: String,
    pub size: u64,
    pub request_timeout: Option<Duration>,
    pub raise_on_error: bool,
    pub clear_scroll: bool,
    pub extra: Vec<(String, String)>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            index: None,
            doc_type: None,
            scroll: DEFAULT_SCROLL.to_string(),
            size: DEFAULT_SIZE,
            request_timeout: None,
            raise_on_error: true,
            clear_scroll: true,
            extra: Vec::new(),
        }
    }
}

impl ScanOptions {
    /// Splits the open parameter map into known options and passthrough
    /// query parameters.
    pub fn from_params(params: &ScanParams) -> Result<Self, ScanError> {
        let mut options = Self::default();

        for (name, value) in params {
            match name.as_str() {
                "index" => options.index = Some(list_param(name, value)?),
                "doc_type" => options.doc_type = Some(string_param(name, value)?),
                "scroll" => options.scroll = string_param(name, value)?,
                "size" => {
                    options.size = value
                        .as_u64()
                        .filter(|size| *size > 0)
                        .ok_or_else(|| invalid(name, "expected a positive integer"))?;
                }
                "request_timeout" => {
                    let timeout = value
                        .as_f64()
                        .filter(|secs| *secs > 0.0)
                        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                        .ok_or_else(|| {
                            invalid(name, "expected a positive, representable number of seconds")
                        })?;
                    options.request_timeout = Some(timeout);
                }
                "raise_on_error" => options.raise_on_error = bool_param(name, value)?,
                "clear_scroll" => options.clear_scroll = bool_param(name, value)?,
                "preserve_order" => {
                    bool_param(name, value)?;
                }
                _ => options.extra.push((name.clone(), list_param(name, value)?)),
            }
        }

        Ok(options)
    }
}

/// Drains every page of the scroll opened by `query`.
///
/// The scroll context is cleared afterwards, whether draining succeeded or not,
/// unless `clear_scroll` is disabled. A failed clear is only logged.
pub async fn scan(
    client: &dyn SearchClient,
    query: &Query,
    params: &ScanParams,
) -> Result<Vec<Document>, ScanError> {
    let options = ScanOptions::from_params(params)?;

    let request = SearchRequest {
        index: options.index.clone(),
        doc_type: options.doc_type.clone(),
        body: query.clone(),
        scroll: options.scroll.clone(),
        size: options.size,
        request_timeout: options.request_timeout,
        extra: options.extra.clone(),
    };

    let first_page = client.search(request).await.map_err(ScanError::Request)?;
    let mut scroll_id = first_page.scroll_id.clone();

    let result = drain(client, &options, first_page, &mut scroll_id).await;

    if options.clear_scroll {
        if let Some(id) = scroll_id {
            if let Err(e) = client.clear_scroll(&[id]).await {
                tracing::warn!("Failed to clear scroll context: {:#}", e);
            }
        }
    }

    result
}

async fn drain(
    client: &dyn SearchClient,
    options: &ScanOptions,
    mut page: SearchResponse,
    scroll_id: &mut Option<String>,
) -> Result<Vec<Document>, ScanError> {
    let mut documents = Vec::new();
    let mut pages = 0usize;

    while !page.hits.hits.is_empty() {
        pages += 1;
        documents.append(&mut page.hits.hits);
        check_shards(&page.shards, options.raise_on_error)?;

        let Some(id) = scroll_id.clone() else {
            break;
        };

        page = client
            .scroll(&id, &options.scroll, options.request_timeout)
            .await
            .map_err(ScanError::Request)?;

        // The backend may hand out a new id on every page.
        if page.scroll_id.is_some() {
            *scroll_id = page.scroll_id.clone();
        }
    }

    tracing::debug!("Scroll drained: {} documents in {} pages", documents.len(), pages);
    Ok(documents)
}

fn check_shards(shards: &ShardStats, raise_on_error: bool) -> Result<(), ScanError> {
    if shards.is_complete() {
        return Ok(());
    }

    tracing::warn!(
        "Scroll request has only succeeded on {} (+{} skipped) shards out of {}",
        shards.successful,
        shards.skipped,
        shards.total
    );

    if raise_on_error {
        return Err(ScanError::ShardFailure {
            total: shards.total,
            successful: shards.successful,
            skipped: shards.skipped,
            failed: shards.failed,
        });
    }

    Ok(())
}

fn invalid(name: &str, reason: &str) -> ScanError {
    ScanError::InvalidParam {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn string_param(name: &str, value: &Value) -> Result<String, ScanError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(name, "expected a string"))
}

fn bool_param(name: &str, value: &Value) -> Result<bool, ScanError> {
    value
        .as_bool()
        .ok_or_else(|| invalid(name, "expected a boolean"))
}

/// Renders a scalar, or a list of scalars joined by commas, as a URL value.
fn list_param(name: &str, value: &Value) -> Result<String, ScanError> {
    match value {
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| scalar_param(name, item))
            .collect::<Result<Vec<_>, _>>()
            .map(|parts| parts.join(",")),
        Value::Array(_) => Err(invalid(name, "expected a non-empty list")),
        other => scalar_param(name, other),
    }
}

fn scalar_param(name: &str, value: &Value) -> Result<String, ScanError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(invalid(name, "expected a string, number or boolean")),
    }
}
