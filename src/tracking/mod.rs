//! Visitor identity subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie request headers
//!     → cookie.rs (parse into RequestCookies)
//!     → identity.rs (reuse or assign party + session identifiers)
//!     → cookie.rs (render renewed Set-Cookie values)
//!     → identifiers handed to the dispatch gateway
//! ```
//!
//! # Design Decisions
//! - Identifier values never change once a client holds them
//! - Expiry slides: every accepted request renews both cookies from "now"
//! - Nothing here is shared between requests; no locking is needed

pub mod cookie;
pub mod identifier;
pub mod identity;

pub use cookie::{RequestCookies, TrackingCookie};
pub use identifier::TrackingIdentifier;
pub use identity::{
    resolve_identifier, Assignment, CookieSpec, Identities, IdentityKind, IdentityManager,
    ResolvedIdentifier,
};
