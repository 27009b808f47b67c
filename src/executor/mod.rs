//! Local Partition Executor Module
//!
//! Executes the scan units produced by the reader. Units are independent, so
//! this module is only one possible scheduler: they can just as well be
//! serialized with `ScanUnit::to_payload` and run by any other worker pool.
//!
//! ## Execution model
//! 1. **Collection**: `PartitionedBag` wraps an ordered list of units.
//! 2. **Scheduling**: each unit is spawned as a tokio task, throttled by a semaphore.
//! 3. **Execution**: each task builds its own client through the `ClientRegistry`.
//! 4. **Aggregation**: results come back in partition order; `count` sums them.
//!
//! ## Submodules
//! - **`bag`**: The partitioned collection and its `compute`/`count` reductions.
//! - **`types`**: Progress events reported while a computation runs.

pub mod bag;
pub mod types;

#[cfg(test)]
mod tests;
