//! Client Factory Registry
//!
//! A registry that maps string-based client type names (e.g., "elasticsearch")
//! to factories building a `SearchClient` from a parameter map. Scan units only
//! carry the name, so the registry is what turns a transmissible recipe back
//! into a live client on the executing side.

use super::elasticsearch::ElasticsearchClient;
use super::types::SearchClient;
use crate::error::ScanError;

use anyhow::Result;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Client type used when a caller does not name one.
pub const DEFAULT_CLIENT_TYPE: &str = "elasticsearch";

/// Type alias for a thread-safe client factory.
/// It takes the unit's client parameters and returns a fresh client.
pub type ClientFactory =
    Arc<dyn Fn(&Map<String, Value>) -> Result<Arc<dyn SearchClient>> + Send + Sync>;

/// Registry holding the mapping between client type names and their factories.
pub struct ClientRegistry {
    factories: DashMap<String, ClientFactory>,
}

impl ClientRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a registry with the Elasticsearch client registered under
    /// [`DEFAULT_CLIENT_TYPE`].
    pub fn with_defaults() -> Arc<Self> {
        let registry = Self::new();
        registry.register(DEFAULT_CLIENT_TYPE, ElasticsearchClient::from_params);
        registry
    }

    /// Registers a factory under a specific client type name.
    ///
    /// Registering the same name twice replaces the earlier factory.
    pub fn register<F, C>(&self, client_type: &str, factory: F)
    where
        F: Fn(&Map<String, Value>) -> Result<C> + Send + Sync + 'static,
        C: SearchClient + 'static,
    {
        // Erase the concrete client type so different backends share one map.
        let factory_fn: ClientFactory = Arc::new(move |params: &Map<String, Value>| {
            factory(params).map(|client| Arc::new(client) as Arc<dyn SearchClient>)
        });

        self.factories.insert(client_type.to_string(), factory_fn);

        tracing::info!("Registered client type: {}", client_type);
    }

    /// Looks up a factory by name and builds a client with the given parameters.
    pub fn build(
        &self,
        client_type: &str,
        params: &Map<String, Value>,
    ) -> std::result::Result<Arc<dyn SearchClient>, ScanError> {
        // Clone the factory out so the map shard is not locked during construction.
        let factory = self
            .factories
            .get(client_type)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ScanError::UnknownClientType(client_type.to_string()))?;

        tracing::debug!(
            "Building '{}' client ({} parameters)",
            client_type,
            params.len()
        );

        factory(params).map_err(ScanError::Client)
    }

    /// Returns a list of all registered client type names.
    pub fn list_client_types(&self) -> Vec<String> {
        self.factories
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Checks if a client type is registered.
    pub fn has_client_type(&self, client_type: &str) -> bool {
        self.factories.contains_key(client_type)
    }

    /// Returns the total number of registered client types.
    pub fn client_type_count(&self) -> usize {
        self.factories.len()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }
}
