//! Port for fixed-window request counters.
use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by rate limit backends.
    pub enum RateLimiterError {
        /// Counter store is unavailable or timing out.
        Backend { message: String } => "rate limiter backend failure: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one hit against `key` and return the total for the current
    /// window. The window starts with the first hit and lasts `window`.
    async fn hit(&self, key: &str, window: Duration) -> Result<u64, RateLimiterError>;
}
