//! Events handed to the processing pool.

use std::net::SocketAddr;

use axum::http::{header, request::Parts, HeaderMap, Method, Uri, Version};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::http::request::X_REQUEST_ID;
use crate::tracking::TrackingIdentifier;

/// Raw request data downstream parsing needs.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    /// All request headers, cookies included.
    pub headers: HeaderMap,
    /// Peer address, when the listener exposes it.
    pub remote_addr: Option<SocketAddr>,
    pub request_id: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    /// Capture the request head. Extensions are dropped.
    pub fn from_parts(
        parts: Parts,
        remote_addr: Option<SocketAddr>,
        received_at: DateTime<Utc>,
    ) -> Self {
        let request_id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            remote_addr,
            request_id,
            received_at,
        }
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Raw query string, where beacon parameters live.
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn header_str(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// One accepted beacon hit.
#[derive(Debug, Clone)]
pub struct Event {
    pub party_id: TrackingIdentifier,
    pub session_id: TrackingIdentifier,
    pub context: RequestContext,
}

impl Event {
    pub fn new(
        party_id: TrackingIdentifier,
        session_id: TrackingIdentifier,
        context: RequestContext,
    ) -> Self {
        Self {
            party_id,
            session_id,
            context,
        }
    }

    /// Key that keeps one party's events in order.
    pub fn partition_key(&self) -> &str {
        self.party_id.as_str()
    }

    pub fn summary(&self) -> EventSummary<'_> {
        EventSummary {
            party_id: &self.party_id,
            session_id: &self.session_id,
            method: self.context.method.as_str(),
            path: self.context.path(),
            query: self.context.query(),
            remote_addr: self.context.remote_addr,
            request_id: self.context.request_id.as_deref(),
            user_agent: self.context.header_str(header::USER_AGENT),
            referer: self.context.header_str(header::REFERER),
            received_at: self
                .context
                .received_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Flat, serializable view of an event for logs.
#[derive(Debug, Serialize)]
pub struct EventSummary<'a> {
    pub party_id: &'a TrackingIdentifier,
    pub session_id: &'a TrackingIdentifier,
    pub method: &'a str,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub remote_addr: Option<SocketAddr>,
    pub request_id: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub referer: Option<&'a str>,
    pub received_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::TimeZone;

    fn context() -> RequestContext {
        let (parts, _) = Request::builder()
            .uri("/csc-event?p=0%3Ai0rjfnxc&l=http%3A%2F%2Fexample.com%2F")
            .header("x-request-id", "req-1")
            .header("user-agent", "test-agent")
            .body(())
            .unwrap()
            .into_parts();
        let received_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        RequestContext::from_parts(parts, Some("10.0.0.1:5000".parse().unwrap()), received_at)
    }

    #[test]
    fn test_context_captures_request_head() {
        let ctx = context();
        assert_eq!(ctx.method, Method::GET);
        assert_eq!(ctx.path(), "/csc-event");
        assert!(ctx.query().unwrap().starts_with("p=0%3Ai0rjfnxc"));
        assert_eq!(ctx.request_id.as_deref(), Some("req-1"));
        assert_eq!(ctx.header_str(header::USER_AGENT), Some("test-agent"));
    }

    #[test]
    fn test_summary_serializes() {
        let event = Event::new(
            TrackingIdentifier::from_cookie("party"),
            TrackingIdentifier::from_cookie("session"),
            context(),
        );
        assert_eq!(event.partition_key(), "party");

        let json = serde_json::to_value(event.summary()).unwrap();
        assert_eq!(json["party_id"], "party");
        assert_eq!(json["session_id"], "session");
        assert_eq!(json["remote_addr"], "10.0.0.1:5000");
        assert_eq!(json["received_at"], "2024-05-01T10:00:00.000Z");
        assert!(json["referer"].is_null());
    }
}
