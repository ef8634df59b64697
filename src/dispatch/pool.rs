//! Processing pool contract.

use thiserror::Error;

use crate::dispatch::event::Event;

/// Failures an enqueue can raise after the client has been answered.
#[derive(Debug, Error)]
pub enum EnqueueError {
    /// The partition's worker is gone and can no longer accept events.
    #[error("partition {partition} is closed")]
    Closed { partition: usize },

    /// The pool cannot take events at all.
    #[error("processing pool unavailable: {0}")]
    Unavailable(String),
}

impl EnqueueError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            EnqueueError::Closed { .. } => "closed",
            EnqueueError::Unavailable(_) => "unavailable",
        }
    }
}

/// Receiver of accepted events.
///
/// Implementations deliver events sharing a partition key in the order they
/// were enqueued. `enqueue` must return promptly without waiting for queue
/// space; capacity pressure is handled inside the pool and is not an error.
pub trait ProcessingPool: Send + Sync {
    fn enqueue(&self, partition_key: &str, event: Event) -> Result<(), EnqueueError>;
}
