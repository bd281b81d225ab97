//! Driving port resolving the caller behind a bearer access token.

use async_trait::async_trait;

use crate::domain::{Error, UserProfile};

/// Domain use-case port for loading the authenticated user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurrentUserQuery: Send + Sync {
    /// Verify `access_token` and return the profile it belongs to.
    async fn current_user(&self, access_token: &str) -> Result<UserProfile, Error>;
}
