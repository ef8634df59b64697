//! Party and session identity resolution.
//!
//! # Responsibilities
//! - Reuse an identifier the client already holds, or assign a fresh one
//! - Produce the renewed cookie for every resolution (sliding expiry)
//! - Resolve party and session independently of each other

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::TrackingConfig;
use crate::observability::metrics;
use crate::tracking::cookie::{RequestCookies, TrackingCookie};
use crate::tracking::identifier::TrackingIdentifier;

/// Which identity a cookie carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityKind {
    Party,
    Session,
}

impl IdentityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityKind::Party => "party",
            IdentityKind::Session => "session",
        }
    }
}

/// How an identifier was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// No cookie was presented; a new identifier was generated.
    Assigned,
    /// The client's existing identifier was kept and its cookie renewed.
    Renewed,
}

impl Assignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Assignment::Assigned => "assigned",
            Assignment::Renewed => "renewed",
        }
    }
}

/// Name, lifetime and scope of one tracking cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    pub kind: IdentityKind,
    pub name: String,
    pub timeout: Duration,
    pub domain: Option<String>,
    pub path: Option<String>,
}

impl CookieSpec {
    pub fn new(kind: IdentityKind, name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            kind,
            name: name.into(),
            timeout,
            domain: None,
            path: None,
        }
    }
}

/// Outcome of resolving one identity.
#[derive(Debug, Clone)]
pub struct ResolvedIdentifier {
    pub value: TrackingIdentifier,
    pub assignment: Assignment,
    /// Cookie to write onto the response.
    pub cookie: TrackingCookie,
}

/// Get-or-create the identifier named by `spec`.
///
/// An existing cookie value is reused unchanged, even when empty. The returned cookie
/// always expires `spec.timeout` after `now`, so every request slides the
/// expiry forward.
pub fn resolve_identifier(
    cookies: &RequestCookies,
    spec: &CookieSpec,
    now: DateTime<Utc>,
) -> ResolvedIdentifier {
    let (value, assignment) = match cookies.get(&spec.name) {
        Some(existing) => (TrackingIdentifier::from_cookie(existing), Assignment::Renewed),
        None => (TrackingIdentifier::generate(), Assignment::Assigned),
    };

    let cookie = TrackingCookie::new(&spec.name, value.as_str(), spec.timeout, now)
        .with_domain(spec.domain.clone())
        .with_path(spec.path.clone());

    ResolvedIdentifier {
        value,
        assignment,
        cookie,
    }
}

/// Both identities resolved for one request.
#[derive(Debug, Clone)]
pub struct Identities {
    pub party: ResolvedIdentifier,
    pub session: ResolvedIdentifier,
}

impl Identities {
    /// Cookies to set, party first.
    pub fn cookies(&self) -> [&TrackingCookie; 2] {
        [&self.party.cookie, &self.session.cookie]
    }
}

/// Resolves party and session identities with fixed cookie settings.
#[derive(Debug, Clone)]
pub struct IdentityManager {
    party: CookieSpec,
    session: CookieSpec,
}

impl IdentityManager {
    pub fn new(party: CookieSpec, session: CookieSpec) -> Self {
        Self { party, session }
    }

    /// Build from validated tracking configuration.
    pub fn from_config(config: &TrackingConfig) -> Self {
        let scoped = |kind, name: &str, secs| CookieSpec {
            domain: config.cookie_domain.clone(),
            path: config.cookie_path.clone(),
            ..CookieSpec::new(kind, name, Duration::from_secs(secs))
        };
        Self::new(
            scoped(IdentityKind::Party, &config.party_cookie, config.party_timeout_secs),
            scoped(IdentityKind::Session, &config.session_cookie, config.session_timeout_secs),
        )
    }

    pub fn party(&self) -> &CookieSpec {
        &self.party
    }

    pub fn session(&self) -> &CookieSpec {
        &self.session
    }

    /// Resolve both identities for a request received at `now`.
    pub fn resolve(&self, cookies: &RequestCookies, now: DateTime<Utc>) -> Identities {
        let party = resolve_identifier(cookies, &self.party, now);
        let session = resolve_identifier(cookies, &self.session, now);

        for (kind, resolved) in [(self.party.kind, &party), (self.session.kind, &session)] {
            metrics::record_identifier(kind.as_str(), resolved.assignment.as_str());
        }

        Identities { party, session }
    }
}
