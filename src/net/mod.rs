//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → listener.rs (bind configured address)
//!     → tls.rs (optional certificate loading)
//!     → Hand off to HTTP layer (axum::serve or axum-server rustls)
//! ```
//!
//! # Design Decisions
//! - Concurrency is bounded in the HTTP layer, not at accept
//! - TLS is optional and handled transparently

pub mod listener;
pub mod tls;
