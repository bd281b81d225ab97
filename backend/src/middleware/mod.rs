//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns:
//! trace identifiers, cross-origin policy, access bans and rate limiting.

pub mod access_guard;
pub mod cors;
pub mod rate_limit;
pub mod trace;

pub use access_guard::{AccessGuard, AccessRules};
pub use cors::cors;
pub use rate_limit::{RateLimit, RateLimitPolicy};
pub use trace::Trace;
