//! Partitioned Collection
//!
//! Runs a set of scan units in parallel on the local tokio runtime and hands
//! back their results in partition order.
//!
//! ## Responsibilities
//! - **Scheduling**: every unit becomes its own task; a semaphore caps how many
//!   scroll scans are in flight.
//! - **Isolation**: a failing unit never cancels its siblings.
//! - **Aggregation**: results are placed by position, so index `i` of the output
//!   is always slice `i`.
//! - **Progress**: an optional callback hears about every finished unit.

use super::types::*;
use crate::client::registry::ClientRegistry;
use crate::client::types::Document;
use crate::error::{PartitionError, ScanError};
use crate::reader::unit::ScanUnit;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Result of one partition.
pub type PartitionResult = Result<Vec<Document>, PartitionError>;

/// An ordered collection of not-yet-executed scan units.
pub struct PartitionedBag {
    units: Vec<ScanUnit>,
    /// Maximum number of units executing at once.
    worker_count: usize,
    progress: Option<ProgressFn>,
}

impl PartitionedBag {
    /// Wraps the units returned by `read_search`.
    ///
    /// The worker count defaults to the available parallelism.
    pub fn from_units(units: Vec<ScanUnit>) -> Self {
        let worker_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        Self {
            units,
            worker_count,
            progress: None,
        }
    }

    /// Caps the number of concurrently running units. `0` is treated as `1`.
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    /// Registers a callback invoked after each unit finishes.
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn npartitions(&self) -> usize {
        self.units.len()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn units(&self) -> &[ScanUnit] {
        &self.units
    }

    /// Executes every unit and returns all documents, partition by partition.
    ///
    /// Fails with the error of the lowest failing partition. All units still
    /// run to completion before the error is returned.
    pub async fn compute(
        self,
        clients: &Arc<ClientRegistry>,
    ) -> Result<Vec<Vec<Document>>, PartitionError> {
        self.compute_partial(clients).await.into_iter().collect()
    }

    /// Total number of documents over all partitions.
    pub async fn count(self, clients: &Arc<ClientRegistry>) -> Result<usize, PartitionError> {
        let partitions = self.compute(clients).await?;
        Ok(partitions.iter().map(Vec::len).sum())
    }

    /// Executes every unit and returns one result per partition, in order.
    pub async fn compute_partial(self, clients: &Arc<ClientRegistry>) -> Vec<PartitionResult> {
        let total = self.units.len();
        tracing::info!(
            "Computing {} partitions with {} workers",
            total,
            self.worker_count
        );

        let identities: Vec<_> = self.units.iter().map(|u| (u.id(), u.slice())).collect();
        let semaphore = Arc::new(Semaphore::new(self.worker_count));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();

        for (position, unit) in self.units.into_iter().enumerate() {
            let clients = clients.clone();
            let semaphore = semaphore.clone();
            let completed = completed.clone();
            let progress = self.progress.clone();

            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring only waits.
                let _permit = semaphore.acquire_owned().await;

                let (unit_id, slice) = (unit.id(), unit.slice());
                let result = unit.execute(&clients).await;

                let outcome = match &result {
                    Ok(documents) => UnitOutcome::Succeeded {
                        documents: documents.len(),
                    },
                    Err(e) => {
                        tracing::error!("{}", e);
                        UnitOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                };

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::info!("Partition {} finished ({}/{})", slice, done, total);

                if let Some(progress) = progress {
                    progress(&ProgressEvent {
                        unit: unit_id,
                        slice,
                        outcome,
                        completed: done,
                        total,
                    });
                }

                (position, result)
            });
        }

        let mut results: Vec<Option<PartitionResult>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, result)) => results[position] = Some(result),
                Err(e) => tracing::error!("Partition task did not complete: {}", e),
            }
        }

        results
            .into_iter()
            .zip(identities)
            .map(|(result, (unit, slice))| {
                result.unwrap_or_else(|| {
                    Err(PartitionError::new(
                        unit,
                        slice,
                        ScanError::Aborted("task panicked or was cancelled".to_string()),
                    ))
                })
            })
            .collect()
    }
}
