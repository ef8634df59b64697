//! Request spans.
//!
//! # Responsibilities
//! - Create one span per request for the tower-http trace layer
//! - Attach the request ID so handler logs correlate with access logs

use axum::{body::Body, http::Request};
use ::tracing::Span;

use crate::http::request::X_REQUEST_ID;

/// Span factory for `TraceLayer::make_span_with`.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    ::tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
