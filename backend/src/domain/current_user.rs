//! Cache-aside resolution of the authenticated user.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use super::auth_service::map_user_error;
use crate::domain::ports::{CurrentUserQuery, TokenService, UserCache, UserCacheKey, UserRepository};
use crate::domain::{Error, TokenScope, UserProfile};

const INVALID_CREDENTIALS: &str = "Unable validate credentials";

/// Extend `ttl` by a random amount of up to a tenth of its length, so
/// entries written together do not all expire together.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use contacts_backend::domain::jittered_ttl;
///
/// let ttl = jittered_ttl(Duration::from_secs(600));
/// assert!(ttl >= Duration::from_secs(600) && ttl <= Duration::from_secs(660));
/// ```
pub fn jittered_ttl(ttl: Duration) -> Duration {
    let spread = ttl.as_secs() / 10;
    if spread == 0 {
        return ttl;
    }
    ttl + Duration::from_secs(rand::thread_rng().gen_range(0..=spread))
}

/// Service implementing [`CurrentUserQuery`] with a cache in front of the
/// user repository.
#[derive(Clone)]
pub struct CurrentUserService<U, C, T> {
    users: Arc<U>,
    cache: Arc<C>,
    tokens: Arc<T>,
    ttl: Duration,
}

impl<U, C, T> CurrentUserService<U, C, T> {
    /// Create a service whose cache entries live for roughly `ttl`.
    pub fn new(users: Arc<U>, cache: Arc<C>, tokens: Arc<T>, ttl: Duration) -> Self {
        Self {
            users,
            cache,
            tokens,
            ttl,
        }
    }
}

#[async_trait]
impl<U, C, T> CurrentUserQuery for CurrentUserService<U, C, T>
where
    U: UserRepository,
    C: UserCache,
    T: TokenService,
{
    async fn current_user(&self, access_token: &str) -> Result<UserProfile, Error> {
        let email = self
            .tokens
            .verify(access_token, TokenScope::AccessToken)
            .map_err(|err| {
                debug!(error = %err, "access token rejected");
                Error::unauthorized(INVALID_CREDENTIALS)
            })?;
        let key = UserCacheKey::for_email(&email);

        match self.cache.get(&key).await {
            Ok(Some(profile)) => return Ok(profile),
            Ok(None) => debug!(%key, "user cache miss"),
            Err(err) => warn!(error = %err, "user cache read failed; falling back to database"),
        }

        let profile = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?
            .profile();

        if let Err(err) = self.cache.put(&key, &profile, jittered_ttl(self.ttl)).await {
            warn!(error = %err, "user cache write failed");
        }
        Ok(profile)
    }
}
