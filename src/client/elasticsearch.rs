//! Elasticsearch REST Client
//!
//! A small reqwest-based client covering the three scroll endpoints the
//! reader needs: `_search?scroll=`, `_search/scroll` and the scroll clear.
//!
//! Construction takes the opaque parameter map carried by a scan unit, so the
//! same recipe can be rebuilt on any worker.

use super::types::{BoxFuture, SearchClient, SearchRequest, SearchResponse};

use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Host used when the parameters name none.
pub const DEFAULT_HOST: &str = "http://localhost:9200";

/// `hosts` may be a single URL or a list of URLs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Hosts {
    One(String),
    Many(Vec<String>),
}

/// Connection parameters accepted by [`ElasticsearchClient::from_params`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ElasticsearchParams {
    hosts: Option<Hosts>,
    username: Option<String>,
    password: Option<String>,
    api_key: Option<String>,
    /// Default timeout in seconds for every request.
    timeout: Option<f64>,
    headers: HashMap<String, String>,
}

enum Auth {
    None,
    Basic { username: String, password: Option<String> },
    ApiKey(String),
}

pub struct ElasticsearchClient {
    /// Base URLs without trailing slash.
    hosts: Vec<String>,
    /// Round-robin cursor into `hosts`.
    next_host: AtomicUsize,
    auth: Auth,
    http_client: reqwest::Client,
}

impl ElasticsearchClient {
    /// Builds a client from a scan unit's parameter map.
    ///
    /// Recognised keys: `hosts`, `username`, `password`, `api_key`,
    /// `timeout` (seconds) and `headers`. Unknown keys are rejected.
    pub fn from_params(params: &Map<String, Value>) -> Result<Self> {
        let params: ElasticsearchParams = serde_json::from_value(Value::Object(params.clone()))
            .context("invalid elasticsearch client parameters")?;

        let hosts = match params.hosts {
            None => vec![DEFAULT_HOST.to_string()],
            Some(Hosts::One(host)) => vec![normalize_host(&host)],
            Some(Hosts::Many(hosts)) if hosts.is_empty() => {
                return Err(anyhow::anyhow!("`hosts` must name at least one host"));
            }
            Some(Hosts::Many(hosts)) => hosts.iter().map(|h| normalize_host(h)).collect(),
        };

        let auth = match (params.api_key, params.username) {
            (Some(_), Some(_)) => {
                return Err(anyhow::anyhow!(
                    "`api_key` and `username` are mutually exclusive"
                ));
            }
            (Some(key), None) => Auth::ApiKey(key),
            (None, Some(username)) => Auth::Basic {
                username,
                password: params.password,
            },
            (None, None) => Auth::None,
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &params.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid header name: {}", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid value for header {}", name))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = params.timeout {
            if secs.is_nan() || secs <= 0.0 {
                return Err(anyhow::anyhow!("`timeout` must be positive, got {}", secs));
            }
            let timeout = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("`timeout` out of range: {}", secs))?;
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            hosts,
            next_host: AtomicUsize::new(0),
            auth,
            http_client: builder.build()?,
        })
    }

    /// The configured base URLs, in round-robin order.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let idx = self.next_host.fetch_add(1, Ordering::Relaxed) % self.hosts.len();
        let url = format!("{}{}", self.hosts[idx], path);
        let builder = self.http_client.request(method, url);

        match &self.auth {
            Auth::None => builder,
            Auth::Basic { username, password } => builder.basic_auth(username, password.as_ref()),
            Auth::ApiKey(key) => builder.header(AUTHORIZATION, format!("ApiKey {}", key)),
        }
    }

    async fn search_impl(&self, request: SearchRequest) -> Result<SearchResponse> {
        let path = search_path(request.index.as_deref(), request.doc_type.as_deref());
        tracing::debug!("Opening scroll at {} (size={})", path, request.size);

        let mut builder = self
            .request(Method::POST, &path)
            .query(&[("scroll", request.scroll.as_str())])
            .query(&[("size", request.size)])
            .query(&request.extra)
            .json(&request.body);
        if let Some(timeout) = request.request_timeout {
            builder = builder.timeout(timeout);
        }

        read_response(builder.send().await?).await
    }

    async fn scroll_impl(
        &self,
        scroll_id: &str,
        keep_alive: &str,
        timeout: Option<Duration>,
    ) -> Result<SearchResponse> {
        let mut builder = self
            .request(Method::POST, "/_search/scroll")
            .json(&json!({ "scroll": keep_alive, "scroll_id": scroll_id }));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        read_response(builder.send().await?).await
    }

    async fn clear_scroll_impl(&self, scroll_ids: &[String]) -> Result<()> {
        let response = self
            .request(Method::DELETE, "/_search/scroll")
            .json(&json!({ "scroll_id": scroll_ids }))
            .send()
            .await?;

        // 404 means the context already expired.
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(anyhow::anyhow!("clear scroll failed: {}", status))
        }
    }
}

impl SearchClient for ElasticsearchClient {
    fn search(&self, request: SearchRequest) -> BoxFuture<'_, Result<SearchResponse>> {
        Box::pin(self.search_impl(request))
    }

    fn scroll<'a>(
        &'a self,
        scroll_id: &'a str,
        keep_alive: &'a str,
        timeout: Option<Duration>,
    ) -> BoxFuture<'a, Result<SearchResponse>> {
        Box::pin(self.scroll_impl(scroll_id, keep_alive, timeout))
    }

    fn clear_scroll<'a>(&'a self, scroll_ids: &'a [String]) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.clear_scroll_impl(scroll_ids))
    }
}

/// Adds a scheme when missing and strips trailing slashes.
fn normalize_host(host: &str) -> String {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

pub(crate) fn search_path(index: Option<&str>, doc_type: Option<&str>) -> String {
    match (index, doc_type) {
        (Some(index), Some(doc_type)) => format!("/{}/{}/_search", index, doc_type),
        (Some(index), None) => format!("/{}/_search", index),
        (None, Some(doc_type)) => format!("/_all/{}/_search", doc_type),
        (None, None) => "/_search".to_string(),
    }
}

async fn read_response(response: reqwest::Response) -> Result<SearchResponse> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("elasticsearch returned {}: {}", status, body));
    }

    response
        .json::<SearchResponse>()
        .await
        .context("malformed search response")
}
