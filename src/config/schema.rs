//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the collector.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the beacon collector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CollectorConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Tracking cookie and event endpoint settings.
    pub tracking: TrackingConfig,

    /// Processing pool sizing.
    pub processing: ProcessingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8290").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8290".to_string(),
            tls: None,
            max_connections: 10_000,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Tracking cookies and the beacon endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Path the beacon is served on.
    pub event_path: String,

    /// Name of the long-lived party cookie.
    pub party_cookie: String,

    /// Party cookie lifetime in seconds, renewed on every request.
    pub party_timeout_secs: u64,

    /// Name of the short-lived session cookie.
    pub session_cookie: String,

    /// Session cookie lifetime in seconds, renewed on every request.
    pub session_timeout_secs: u64,

    /// Optional `Domain` attribute for both cookies.
    pub cookie_domain: Option<String>,

    /// Optional `Path` attribute for both cookies.
    pub cookie_path: Option<String>,

    /// Optional GIF to serve instead of the built-in transparent pixel.
    pub pixel_path: Option<String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            event_path: "/csc-event".to_string(),
            party_cookie: "_dvp".to_string(),
            party_timeout_secs: 730 * 24 * 60 * 60,
            session_cookie: "_dvs".to_string(),
            session_timeout_secs: 30 * 60,
            cookie_domain: None,
            cookie_path: None,
            pixel_path: None,
        }
    }
}

/// Sizing of the in-process processing pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of partitions, each drained by its own worker task.
    pub workers: usize,

    /// Maximum queued events per partition before new events are dropped.
    pub queue_capacity: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 1_048_576,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Time allowed for connections and queues to drain on shutdown, in seconds.
    pub shutdown_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("text" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9290".to_string(),
        }
    }
}
