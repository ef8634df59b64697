//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate cookie names, timeouts and addresses before anything binds
//! - Validate value ranges (timeouts > 0, pool sizes > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CollectorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::CollectorConfig;
use crate::tracking::cookie::{is_valid_attribute_value, is_valid_cookie_name};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &CollectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() {
            errors.push(ValidationError::new("listener.tls.cert_path", "must not be empty"));
        }
        if tls.key_path.trim().is_empty() {
            errors.push(ValidationError::new("listener.tls.key_path", "must not be empty"));
        }
    }

    let tracking = &config.tracking;
    if !tracking.event_path.starts_with('/') {
        errors.push(ValidationError::new("tracking.event_path", "must start with '/'"));
    }
    for (field, name) in [
        ("tracking.party_cookie", &tracking.party_cookie),
        ("tracking.session_cookie", &tracking.session_cookie),
    ] {
        if !is_valid_cookie_name(name) {
            errors.push(ValidationError::new(
                field,
                format!("'{}' is not a valid cookie name", name),
            ));
        }
    }
    if tracking.party_cookie == tracking.session_cookie {
        errors.push(ValidationError::new(
            "tracking.session_cookie",
            "must differ from tracking.party_cookie",
        ));
    }
    if tracking.party_timeout_secs == 0 {
        errors.push(ValidationError::new("tracking.party_timeout_secs", "must be greater than 0"));
    }
    if tracking.session_timeout_secs == 0 {
        errors.push(ValidationError::new("tracking.session_timeout_secs", "must be greater than 0"));
    }
    for (field, value) in [
        ("tracking.cookie_domain", &tracking.cookie_domain),
        ("tracking.cookie_path", &tracking.cookie_path),
    ] {
        if let Some(value) = value {
            if !is_valid_attribute_value(value) {
                errors.push(ValidationError::new(
                    field,
                    "must be non-empty without ';' or control characters",
                ));
            }
        }
    }

    if config.processing.workers == 0 {
        errors.push(ValidationError::new("processing.workers", "must be greater than 0"));
    }
    if config.processing.queue_capacity == 0 {
        errors.push(ValidationError::new("processing.queue_capacity", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", observability.log_level),
        ));
    }
    if !LOG_FORMATS.contains(&observability.log_format.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_format",
            "must be \"text\" or \"json\"",
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
