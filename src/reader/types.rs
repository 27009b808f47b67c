use crate::client::registry::DEFAULT_CLIENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A search request body in the backend's query DSL.
pub type Query = Map<String, Value>;

/// Backend scan parameters forwarded verbatim to every partition.
pub type ScanParams = Map<String, Value>;

/// Unique identifier for a scan unit.
///
/// Wrapper around a UUID so failures can be traced back to the unit that
/// produced them, even after it was shipped to another worker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UnitId(pub uuid::Uuid);

impl UnitId {
    /// Generates a new random UUID v4-based UnitId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifies one slice of a sliced scroll.
///
/// Within a single build, ids run contiguously from `0` to `max - 1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SliceDescriptor {
    pub id: u32,
    pub max: u32,
}

impl fmt::Display for SliceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id, self.max)
    }
}

/// The recipe for building a client on the executing side.
///
/// Only plain data travels with a scan unit: the registered client type name
/// and the parameters handed to its factory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    pub client_type: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_type: DEFAULT_CLIENT_TYPE.to_string(),
            params: Map::new(),
        }
    }
}

impl ClientConfig {
    pub fn new(client_type: impl Into<String>) -> Self {
        Self {
            client_type: client_type.into(),
            params: Map::new(),
        }
    }

    /// Adds one constructor parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}
