//! Search Backend Module
//!
//! Everything a scan unit needs once it is running on a worker: a way to
//! construct a client from plain data, and the logic that drains a scroll.
//!
//! ## Why clients are built late
//! A live client owns a connection pool and cannot be shipped to another
//! process. Scan units therefore carry only a client *type name* and a
//! parameter map; the executing side resolves the name in a `ClientRegistry`
//! and builds a fresh client for that unit.
//!
//! ## Submodules
//! - **`types`**: The `SearchClient` trait and the request/response shapes of the scroll API.
//! - **`elasticsearch`**: The reqwest implementation talking to the Elasticsearch REST API.
//! - **`registry`**: Maps client type names (e.g., "elasticsearch") to factories.
//! - **`scan`**: Drains a scroll until exhaustion, checking shard health on every page.

pub mod elasticsearch;
pub mod registry;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;
