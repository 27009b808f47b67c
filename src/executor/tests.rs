//! Executor Module Tests
//!
//! ## Test Scopes
//! - **Aggregation**: positional results, `count` over all partitions.
//! - **Isolation**: one failing partition surfaces by slice while siblings finish.
//! - **Progress**: one event per unit, ending at `total`.

#[cfg(test)]
mod tests {
    use crate::client::fake::{FAKE_CLIENT_TYPE, FakeSearchClient, numbered_documents, slice_of};
    use crate::error::ScanError;
    use crate::executor::bag::PartitionedBag;
    use crate::executor::types::{ProgressEvent, UnitOutcome};
    use crate::reader::builder::read_search;
    use crate::reader::options::ReadOptions;
    use crate::reader::types::{ClientConfig, SliceDescriptor};
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    fn fake_bag(npartitions: u32) -> PartitionedBag {
        let options = ReadOptions::new()
            .npartitions(npartitions)
            .client(ClientConfig::new(FAKE_CLIENT_TYPE))
            .size(4);
        PartitionedBag::from_units(read_search(None, options).unwrap())
    }

    // ============================================================
    // TEST 1: Aggregation
    // ============================================================

    #[tokio::test]
    async fn test_count_sums_all_partitions() {
        let backend = FakeSearchClient::with_documents(numbered_documents(50));
        let registry = backend.registry();
        let bag = fake_bag(8);
        assert_eq!(bag.npartitions(), 8);

        let count = bag.count(&registry).await.unwrap();

        assert_eq!(count, 50);
        assert_eq!(backend.connections(), 8);
    }

    #[tokio::test]
    async fn test_compute_keeps_partition_order() {
        // ARRANGE
        let backend = FakeSearchClient::with_documents(numbered_documents(30));
        let registry = backend.registry();

        // ACT
        let partitions = fake_bag(3).compute(&registry).await.unwrap();

        // ASSERT: partition i only holds documents hashed to slice i
        assert_eq!(partitions.len(), 3);
        let mut seen = HashSet::new();
        for (i, documents) in partitions.iter().enumerate() {
            for doc in documents {
                let id = doc["_id"].as_str().unwrap();
                assert_eq!(slice_of(id, 3), i as u32);
                assert!(seen.insert(id.to_string()), "duplicate document {}", id);
            }
        }
        assert_eq!(seen.len(), 30);
    }

    #[tokio::test]
    async fn test_single_worker_still_runs_everything() {
        let backend = FakeSearchClient::with_documents(numbered_documents(9));
        let registry = backend.registry();
        let bag = fake_bag(5).with_workers(0);
        assert_eq!(bag.worker_count(), 1);

        assert_eq!(bag.count(&registry).await.unwrap(), 9);
    }

    // ============================================================
    // TEST 2: Isolation
    // ============================================================

    #[tokio::test]
    async fn test_failing_partition_is_reported_by_slice() {
        // ARRANGE: slice 2 of 4 is unreachable
        let backend = FakeSearchClient::with_documents(numbered_documents(40));
        backend.fail_slice(2);
        let registry = backend.registry();

        // ACT
        let error = fake_bag(4).compute(&registry).await.unwrap_err();

        // ASSERT
        assert_eq!(error.slice, SliceDescriptor { id: 2, max: 4 });
        assert!(matches!(error.source, ScanError::Request(_)));
        // Siblings were not cancelled.
        assert_eq!(backend.connections(), 4);
    }

    #[tokio::test]
    async fn test_compute_partial_keeps_successful_siblings() {
        let backend = FakeSearchClient::with_documents(numbered_documents(40));
        backend.fail_slice(1);
        let registry = backend.registry();

        let results = fake_bag(3).compute_partial(&registry).await;

        assert_eq!(results.len(), 3);
        assert!(results[1].is_err());
        let succeeded: usize = [&results[0], &results[2]]
            .iter()
            .map(|r| r.as_ref().unwrap().len())
            .sum();
        let expected = numbered_documents(40)
            .iter()
            .filter(|doc| slice_of(doc["_id"].as_str().unwrap(), 3) != 1)
            .count();
        assert_eq!(succeeded, expected);
    }

    // ============================================================
    // TEST 3: Progress
    // ============================================================

    #[tokio::test]
    async fn test_progress_reports_every_unit() {
        let backend = FakeSearchClient::with_documents(numbered_documents(16));
        backend.fail_slice(0);
        let registry = backend.registry();
        let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        let bag = fake_bag(4).with_progress(move |event| sink.lock().unwrap().push(event.clone()));
        let _ = bag.compute_partial(&registry).await;

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);

        let completed: Vec<usize> = events.iter().map(|e| e.completed).collect();
        assert_eq!(completed, vec![1, 2, 3, 4]);
        assert!(events.iter().all(|e| e.total == 4));
        assert_eq!(events.last().unwrap().fraction(), 1.0);

        let slices: HashSet<u32> = events.iter().map(|e| e.slice.id).collect();
        assert_eq!(slices, HashSet::from([0, 1, 2, 3]));

        let failed: Vec<_> = events
            .iter()
            .filter(|e| matches!(e.outcome, UnitOutcome::Failed { .. }))
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].slice.id, 0);
    }

    #[tokio::test]
    async fn test_empty_bag_computes_nothing() {
        let registry = FakeSearchClient::default().registry();

        let bag = PartitionedBag::from_units(Vec::new());

        assert_eq!(bag.npartitions(), 0);
        assert_eq!(bag.count(&registry).await.unwrap(), 0);
    }
}
