//! Partitioned Scan Builder
//!
//! Turns one query and a partition count into an ordered list of deferred scan
//! units, one per scroll slice.
//!
//! ## How a query is partitioned
//! 1. **Copy**: every partition works on its own copy of the caller's query.
//! 2. **Sort**: `["_doc"]` is injected unless the caller already sorts. Sliced
//!    scrolls need a stable order to return each document exactly once.
//! 3. **Slice**: `{"id": i, "max": n}` is injected. The backend maps each id to
//!    a disjoint share of the result set.
//! 4. **Params**: the caller's scan parameters are attached verbatim.
//!
//! Building performs no I/O. Clients are created only when a unit executes.
//!
//! ## Submodules
//! - **`types`**: Query aliases, slice descriptors, client configuration and unit ids.
//! - **`options`**: `ReadOptions`, the builder-style input to `read_search`.
//! - **`builder`**: Validation and per-partition query construction.
//! - **`unit`**: `ScanUnit`, the serializable deferred computation and its execution body.

pub mod builder;
pub mod options;
pub mod types;
pub mod unit;
