//! Cross-origin policy for browser clients.

use actix_cors::Cors;

use crate::domain::TRACE_ID_HEADER;

/// Preflight answers are cached by browsers for this many seconds.
const PREFLIGHT_MAX_AGE_SECS: usize = 3600;

/// Any origin, method and header, with credentials.
///
/// Because credentials are allowed the caller's `Origin` is echoed back
/// rather than `*`. The trace id header is exposed to scripts.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .expose_headers([TRACE_ID_HEADER])
        .max_age(PREFLIGHT_MAX_AGE_SECS)
}
