//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, method gate)
//!     → [tracking resolves party + session cookies]
//!     → response.rs (202 pixel or 405 rejection)
//!     → [dispatch enqueues the event]
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MethodNotAllowed, X_REQUEST_ID};
pub use response::{Pixel, PixelError};
pub use server::{AppState, HttpServer};
