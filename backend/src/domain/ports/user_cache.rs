//! Port interface for caching user profiles.
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::UserProfile;

use super::{UserCacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum UserCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "user cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "user cache serialisation failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCache: Send + Sync {
    /// Read a cached profile for the given key.
    async fn get(&self, key: &UserCacheKey) -> Result<Option<UserProfile>, UserCacheError>;

    /// Store a profile under `key` for `ttl`.
    async fn put(
        &self,
        key: &UserCacheKey,
        profile: &UserProfile,
        ttl: Duration,
    ) -> Result<(), UserCacheError>;

    /// Drop the entry for `key`, if present.
    async fn evict(&self, key: &UserCacheKey) -> Result<(), UserCacheError>;
}
