//! Per-event processing hook run by pool workers.

use crate::dispatch::event::Event;

/// Downstream handling of one event.
///
/// Called on a worker task, in partition order. Implementations must not
/// block the runtime; hand heavy work to a dedicated thread or channel.
pub trait EventProcessor: Send + Sync {
    fn process(&self, partition: usize, event: Event);
}

/// Emits one structured debug record per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingProcessor;

impl EventProcessor for LoggingProcessor {
    fn process(&self, partition: usize, event: Event) {
        match serde_json::to_string(&event.summary()) {
            Ok(record) => tracing::debug!(partition, event = %record, "Processed event"),
            Err(e) => tracing::warn!(partition, error = %e, "Failed to serialize event summary"),
        }
    }
}
