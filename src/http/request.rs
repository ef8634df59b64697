//! Request gating and identification.
//!
//! # Responsibilities
//! - Admit only GET beacons; reject everything else before side effects
//! - Generate unique request ID (UUID) and echo it on the response
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The gate runs before cookies are read, so rejected requests touch no state

use axum::http::{HeaderName, Method};
use thiserror::Error;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// A beacon request used a method other than GET.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP method {method} not allowed.")]
pub struct MethodNotAllowed {
    pub method: Method,
}

/// Admit GET, reject anything else.
pub fn gate(method: &Method) -> Result<(), MethodNotAllowed> {
    if method == Method::GET {
        Ok(())
    } else {
        Err(MethodNotAllowed {
            method: method.clone(),
        })
    }
}

/// Assigns a UUID request ID when the client did not send one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Copies the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_admits_get() {
        assert!(gate(&Method::GET).is_ok());
    }

    #[test]
    fn test_gate_rejects_other_methods() {
        for method in [
            Method::POST,
            Method::HEAD,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::from_bytes(b"BREW").unwrap(),
        ] {
            let rejection = gate(&method).unwrap_err();
            assert_eq!(rejection.method, method);
        }
    }

    #[test]
    fn test_rejection_message_names_method() {
        let rejection = gate(&Method::POST).unwrap_err();
        assert_eq!(rejection.to_string(), "HTTP method POST not allowed.");
    }
}
