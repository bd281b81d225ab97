//! Profile mutations for the authenticated user.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::auth_service::map_user_error;
use super::current_user::jittered_ttl;
use crate::domain::ports::{
    AvatarStore, AvatarStoreError, AvatarUpload, ProfileCommand, UserCache, UserCacheKey,
    UserRepository,
};
use crate::domain::{Error, UserProfile};

/// Folder on the image host holding avatars.
pub const AVATAR_FOLDER: &str = "contacts";

fn map_avatar_error(error: AvatarStoreError) -> Error {
    match error {
        AvatarStoreError::Unavailable { message } => {
            Error::service_unavailable(format!("image host unavailable: {message}"))
        }
        AvatarStoreError::Rejected { message } => {
            Error::invalid_request(format!("avatar rejected: {message}"))
        }
    }
}

/// Service implementing [`ProfileCommand`].
#[derive(Clone)]
pub struct ProfileService<U, C, A> {
    users: Arc<U>,
    cache: Arc<C>,
    avatars: Arc<A>,
    ttl: Duration,
}

impl<U, C, A> ProfileService<U, C, A> {
    /// Create a service; refreshed cache entries live for roughly `ttl`.
    pub fn new(users: Arc<U>, cache: Arc<C>, avatars: Arc<A>, ttl: Duration) -> Self {
        Self {
            users,
            cache,
            avatars,
            ttl,
        }
    }
}

#[async_trait]
impl<U, C, A> ProfileCommand for ProfileService<U, C, A>
where
    U: UserRepository,
    C: UserCache,
    A: AvatarStore,
{
    async fn update_avatar(
        &self,
        profile: &UserProfile,
        upload: AvatarUpload,
    ) -> Result<UserProfile, Error> {
        if upload.is_empty() {
            return Err(Error::invalid_request("Avatar file must not be empty"));
        }

        let public_id = format!("{AVATAR_FOLDER}/{}", profile.id);
        let url = self
            .avatars
            .upload(&public_id, &upload)
            .await
            .map_err(map_avatar_error)?;

        let updated = self
            .users
            .update_avatar(&profile.id, &url)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))?
            .profile();

        let key = UserCacheKey::for_email(&updated.email);
        if let Err(err) = self.cache.put(&key, &updated, jittered_ttl(self.ttl)).await {
            warn!(error = %err, "user cache refresh failed; evicting");
            if let Err(err) = self.cache.evict(&key).await {
                warn!(error = %err, "user cache eviction failed");
            }
        }
        info!(user_id = %updated.id, "avatar updated");
        Ok(updated)
    }
}
