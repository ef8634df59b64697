//! Event dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted request (identities resolved, response composed)
//!     → event.rs (party id, session id, raw request context)
//!     → gateway.rs (enqueue keyed by party id, absorb faults)
//!     → pool.rs contract (ProcessingPool)
//!     → partitioned.rs (default pool: hash(key) → bounded queue → worker)
//!     → processor.rs (per-event hook, in partition order)
//! ```
//!
//! # Design Decisions
//! - Enqueue never waits; the request path stays independent of pool load
//! - Per-party ordering comes from deterministic partitioning
//! - Enqueue faults are logged, never returned to the client, never retried

pub mod event;
pub mod gateway;
pub mod partitioned;
pub mod pool;
pub mod processor;

pub use event::{Event, RequestContext};
pub use gateway::DispatchGateway;
pub use partitioned::{PartitionedPool, PoolWorkers};
pub use pool::{EnqueueError, ProcessingPool};
pub use processor::{EventProcessor, LoggingProcessor};
