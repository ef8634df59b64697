//! Clickstream beacon collector library.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod tracking;

pub use config::schema::CollectorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
