//! Tracking identifiers.

use serde::Serialize;
use uuid::Uuid;

/// Opaque party or session identifier.
///
/// Freshly assigned identifiers are random (v4) UUIDs. Identifiers taken from
/// an inbound cookie are kept exactly as the client sent them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TrackingIdentifier(String);

impl TrackingIdentifier {
    /// Generate a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuse a value presented by the client.
    pub fn from_cookie(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for TrackingIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackingIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
