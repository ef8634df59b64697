//! In-process processing pool partitioned by key.
//!
//! # Responsibilities
//! - Route each event to a fixed partition derived from its key
//! - Run one worker task per partition, draining a bounded queue in order
//! - Shed load when a partition queue is full instead of waiting
//!
//! # Design Decisions
//! - Same key → same partition → FIFO; no ordering across partitions
//! - Enqueue is `try_send`: a saturated pool never holds up request handling
//! - A panicking processor loses only the event it was handling
//! - A worker gone with its runtime surfaces as `EnqueueError::Closed`

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::config::ProcessingConfig;
use crate::dispatch::event::Event;
use crate::dispatch::pool::{EnqueueError, ProcessingPool};
use crate::dispatch::processor::EventProcessor;
use crate::observability::metrics;

/// Stable partition index for a key.
pub fn partition_for(key: &str, partitions: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % partitions.max(1) as u64) as usize
}

/// Sending side of the pool, shared with request handlers.
#[derive(Debug)]
pub struct PartitionedPool {
    queues: Vec<mpsc::Sender<Event>>,
}

/// Worker tasks of a [`PartitionedPool`].
///
/// Workers exit once every queue is closed, which happens when the pool is
/// dropped.
#[derive(Debug)]
pub struct PoolWorkers {
    handles: Vec<JoinHandle<()>>,
}

impl PartitionedPool {
    /// Spawn the partition workers. Must be called within a Tokio runtime.
    pub fn start(
        config: &ProcessingConfig,
        processor: Arc<dyn EventProcessor>,
    ) -> (Self, PoolWorkers) {
        let partitions = config.workers.max(1);
        let mut queues = Vec::with_capacity(partitions);
        let mut handles = Vec::with_capacity(partitions);

        for partition in 0..partitions {
            let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
            handles.push(tokio::spawn(run_worker(partition, rx, processor.clone())));
            queues.push(tx);
        }

        tracing::info!(
            partitions,
            queue_capacity = config.queue_capacity,
            "Processing pool started"
        );

        (Self { queues }, PoolWorkers { handles })
    }

    pub fn partitions(&self) -> usize {
        self.queues.len()
    }
}

impl ProcessingPool for PartitionedPool {
    fn enqueue(&self, partition_key: &str, event: Event) -> Result<(), EnqueueError> {
        let partition = partition_for(partition_key, self.queues.len());

        match self.queues[partition].try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    partition,
                    party_id = %event.party_id,
                    "Partition queue full, dropping event"
                );
                metrics::record_event_dropped("queue_full");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(EnqueueError::Closed { partition }),
        }
    }
}

async fn run_worker(
    partition: usize,
    mut queue: mpsc::Receiver<Event>,
    processor: Arc<dyn EventProcessor>,
) {
    while let Some(event) = queue.recv().await {
        let party_id = event.party_id.clone();
        match panic::catch_unwind(AssertUnwindSafe(|| processor.process(partition, event))) {
            Ok(()) => metrics::record_event_processed(),
            Err(payload) => {
                let cause = payload
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("unknown");
                tracing::error!(partition, party_id = %party_id, cause, "Event processor panicked");
                metrics::record_event_failed();
            }
        }
    }
    tracing::debug!(partition, "Partition worker drained");
}

impl PoolWorkers {
    /// Wait for all workers to finish. Returns false if `timeout` elapsed first.
    pub async fn join(self, timeout: Duration) -> bool {
        let drain = async {
            for handle in self.handles {
                if let Err(e) = handle.await {
                    tracing::error!(error = %e, "Partition worker failed");
                }
            }
        };
        tokio::time::timeout(timeout, drain).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::event::RequestContext;
    use crate::tracking::TrackingIdentifier;
    use axum::http::Request;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(usize, String, String)>>,
    }

    impl EventProcessor for Recorder {
        fn process(&self, partition: usize, event: Event) {
            self.seen.lock().unwrap().push((
                partition,
                event.party_id.into_string(),
                event.session_id.into_string(),
            ));
        }
    }

    /// Panics on the first event, records the rest.
    #[derive(Default)]
    struct PanicsOnFirst {
        inner: Recorder,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl EventProcessor for PanicsOnFirst {
        fn process(&self, partition: usize, event: Event) {
            if self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                panic!("processor failure");
            }
            self.inner.process(partition, event);
        }
    }

    fn event(party: &str, seq: usize) -> Event {
        let (parts, _) = Request::builder()
            .uri("/csc-event")
            .body(())
            .unwrap()
            .into_parts();
        Event::new(
            TrackingIdentifier::from_cookie(party),
            TrackingIdentifier::from_cookie(seq.to_string()),
            RequestContext::from_parts(parts, None, Utc::now()),
        )
    }

    fn config(workers: usize, queue_capacity: usize) -> ProcessingConfig {
        ProcessingConfig {
            workers,
            queue_capacity,
        }
    }

    #[test]
    fn test_partition_for_is_stable() {
        for key in ["a", "party-1", "0f8fad5b-d9cb-469f-a165-70867728950e"] {
            let p = partition_for(key, 7);
            assert!(p < 7);
            assert_eq!(p, partition_for(key, 7));
        }
        assert_eq!(partition_for("anything", 1), 0);
        assert_eq!(partition_for("anything", 0), 0);
    }

    #[tokio::test]
    async fn test_events_for_one_key_stay_ordered() {
        let recorder = Arc::new(Recorder::default());
        let (pool, workers) = PartitionedPool::start(&config(4, 1024), recorder.clone());
        assert_eq!(pool.partitions(), 4);

        for seq in 0..100 {
            pool.enqueue("party-a", event("party-a", seq)).unwrap();
            pool.enqueue("party-b", event("party-b", seq)).unwrap();
        }
        drop(pool);
        assert!(workers.join(Duration::from_secs(5)).await);

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 200);
        for party in ["party-a", "party-b"] {
            let expected_partition = partition_for(party, 4);
            let sequence: Vec<usize> = seen
                .iter()
                .filter(|(_, p, _)| p == party)
                .map(|(partition, _, seq)| {
                    assert_eq!(*partition, expected_partition);
                    seq.parse().unwrap()
                })
                .collect();
            assert_eq!(sequence, (0..100).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_error() {
        let recorder = Arc::new(Recorder::default());
        let (pool, workers) = PartitionedPool::start(&config(1, 1), recorder.clone());

        // The current-thread test runtime has not polled the worker yet.
        assert!(pool.enqueue("p", event("p", 0)).is_ok());
        assert!(pool.enqueue("p", event("p", 1)).is_ok());

        drop(pool);
        assert!(workers.join(Duration::from_secs(5)).await);
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].2, "0");
    }

    #[tokio::test]
    async fn test_processor_panic_keeps_partition_alive() {
        let processor = Arc::new(PanicsOnFirst::default());
        let (pool, workers) = PartitionedPool::start(&config(1, 8), processor.clone());

        pool.enqueue("p", event("p", 0)).unwrap();
        pool.enqueue("p", event("p", 1)).unwrap();
        pool.enqueue("q", event("q", 2)).unwrap();

        drop(pool);
        assert!(workers.join(Duration::from_secs(5)).await);

        let seen = processor.inner.seen.lock().unwrap();
        let sessions: Vec<&str> = seen.iter().map(|(_, _, s)| s.as_str()).collect();
        assert_eq!(sessions, vec!["1", "2"]);
    }

    #[test]
    fn test_enqueue_after_runtime_gone_reports_closed() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let (pool, _workers) = runtime.block_on(async {
            PartitionedPool::start(&config(1, 8), Arc::new(Recorder::default()))
        });
        drop(runtime);

        let err = pool.enqueue("p", event("p", 0)).unwrap_err();
        assert!(matches!(err, EnqueueError::Closed { partition: 0 }));
        assert_eq!(err.reason(), "closed");
    }
}
