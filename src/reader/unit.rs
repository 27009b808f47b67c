//! Deferred Scan Unit
//!
//! A `ScanUnit` is the description of "fetch every document of slice `i`".
//! It holds only plain data: the client recipe, the full per-slice query and
//! the forwarded scan parameters. It can be serialized, shipped to another
//! worker and executed there.
//!
//! ## Lifecycle
//! 1. **Built**: created by `read_search`, nothing has touched the network.
//! 2. **Executed**: `execute` consumes the unit, builds a fresh client through
//!    the `ClientRegistry`, drains the scroll and returns the documents or a
//!    `PartitionError` naming the slice.

use super::types::{ClientConfig, Query, ScanParams, SliceDescriptor, UnitId};
use crate::client::registry::ClientRegistry;
use crate::client::scan::scan;
use crate::client::types::Document;
use crate::error::{PartitionError, ReadError};

use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanUnit {
    id: UnitId,
    slice: SliceDescriptor,
    client: ClientConfig,
    query: Query,
    params: ScanParams,
}

impl ScanUnit {
    pub(crate) fn new(
        slice: SliceDescriptor,
        client: ClientConfig,
        query: Query,
        params: ScanParams,
    ) -> Self {
        Self {
            id: UnitId::new(),
            slice,
            client,
            query,
            params,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn slice(&self) -> SliceDescriptor {
        self.slice
    }

    pub fn client(&self) -> &ClientConfig {
        &self.client
    }

    /// The request body for this slice, including `sort` and `slice`.
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    /// Encodes the unit for transmission to a remote worker.
    pub fn to_payload(&self) -> Result<serde_json::Value, ReadError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decodes a unit received from the building side.
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, ReadError> {
        Ok(serde_json::from_value(payload)?)
    }

    /// Runs the scan for this slice.
    ///
    /// The client is constructed here and dropped when the scan ends; it is
    /// never shared with sibling units. No retry is attempted.
    pub async fn execute(
        self,
        clients: &ClientRegistry,
    ) -> Result<Vec<Document>, PartitionError> {
        let started = Instant::now();
        tracing::debug!(
            "Executing unit {} for slice {} with '{}' client",
            self.id,
            self.slice,
            self.client.client_type
        );

        let fail = |source| PartitionError::new(self.id, self.slice, source);

        let client = clients
            .build(&self.client.client_type, &self.client.params)
            .map_err(fail)?;

        let documents = scan(client.as_ref(), &self.query, &self.params)
            .await
            .map_err(fail)?;

        tracing::debug!(
            "Slice {} returned {} documents in {:?}",
            self.slice,
            documents.len(),
            started.elapsed()
        );

        Ok(documents)
    }
}
