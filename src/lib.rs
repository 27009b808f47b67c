//! Partitioned Sliced-Scroll Reader
//!
//! This library turns one logical search query into `npartitions` independent,
//! serializable scan units. Each unit drains one slice of an Elasticsearch
//! scroll when it is executed, which may happen on a different worker than
//! the one that built it.
//!
//! ## Architecture Modules
//! The crate is composed of three loosely coupled subsystems:
//!
//! - **`reader`**: The partitioned scan builder. Copies the caller's query per
//!   partition, injects the default `_doc` sort and a `slice` descriptor, and
//!   wraps the result in a deferred `ScanUnit`.
//! - **`client`**: The search backend layer. Defines the `SearchClient` trait,
//!   the reqwest-based Elasticsearch client, the registry of client factories
//!   used to build clients on the executing side, and the scroll-draining `scan`.
//! - **`executor`**: A local parallel collection of scan units. Runs every unit
//!   as an independent tokio task and aggregates the results positionally.
//!
//! Errors surfaced at the public seams live in **`error`**.

pub mod client;
pub mod error;
pub mod executor;
pub mod reader;

pub use client::registry::{ClientRegistry, DEFAULT_CLIENT_TYPE};
pub use error::{PartitionError, ReadError, ScanError};
pub use executor::bag::PartitionedBag;
pub use reader::builder::read_search;
pub use reader::options::ReadOptions;
pub use reader::unit::ScanUnit;
