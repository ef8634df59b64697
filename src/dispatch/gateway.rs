//! Hand-off from the request path to the processing pool.

use std::sync::Arc;

use crate::dispatch::event::Event;
use crate::dispatch::pool::ProcessingPool;
use crate::observability::metrics;

/// Enqueues accepted events keyed by party identifier.
///
/// Faults raised by the pool are logged and counted here. They never reach
/// the client, which has already been answered, and are not retried.
#[derive(Clone)]
pub struct DispatchGateway {
    pool: Arc<dyn ProcessingPool>,
}

impl DispatchGateway {
    pub fn new(pool: Arc<dyn ProcessingPool>) -> Self {
        Self { pool }
    }

    pub fn dispatch(&self, event: Event) {
        let party_id = event.party_id.clone();

        tracing::debug!(
            party_id = %party_id,
            session_id = %event.session_id,
            "Enqueuing event"
        );

        match self.pool.enqueue(party_id.as_str(), event) {
            Ok(()) => metrics::record_event_enqueued(),
            Err(e) => {
                tracing::error!(party_id = %party_id, error = %e, "Failed to enqueue event");
                metrics::record_dispatch_fault(e.reason());
            }
        }
    }
}

impl std::fmt::Debug for DispatchGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchGateway").finish_non_exhaustive()
    }
}
