//! Driving port for profile mutations.

use async_trait::async_trait;

use crate::domain::{Error, UserProfile};

use super::AvatarUpload;

/// Domain use-case port for changing the authenticated user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Replace the avatar and return the updated profile.
    async fn update_avatar(
        &self,
        profile: &UserProfile,
        upload: AvatarUpload,
    ) -> Result<UserProfile, Error>;
}
