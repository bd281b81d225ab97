//! Redis-backed `UserCache` adapter.
//!
//! Profiles are stored as JSON strings under `user:<email>` with `SET .. EX`.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis;

use crate::domain::UserProfile;
use crate::domain::ports::{UserCache, UserCacheError, UserCacheKey};

use super::pool::RedisPool;

/// Stores [`UserProfile`] snapshots in Redis.
#[derive(Clone)]
pub struct RedisUserCache {
    pool: RedisPool,
}

impl RedisUserCache {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

fn backend(err: impl ToString) -> UserCacheError {
    UserCacheError::backend(err.to_string())
}

pub(crate) fn encode_profile(profile: &UserProfile) -> Result<String, UserCacheError> {
    serde_json::to_string(profile).map_err(|err| UserCacheError::serialization(err.to_string()))
}

pub(crate) fn decode_profile(raw: &str) -> Result<UserProfile, UserCacheError> {
    serde_json::from_str(raw).map_err(|err| UserCacheError::serialization(err.to_string()))
}

/// Redis rejects `EX 0`, so sub-second TTLs round up.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get(&self, key: &UserCacheKey) -> Result<Option<UserProfile>, UserCacheError> {
        let mut conn = self.pool.get().await.map_err(backend)?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(backend)?;
        raw.as_deref().map(decode_profile).transpose()
    }

    async fn put(
        &self,
        key: &UserCacheKey,
        profile: &UserProfile,
        ttl: Duration,
    ) -> Result<(), UserCacheError> {
        let payload = encode_profile(profile)?;
        let mut conn = self.pool.get().await.map_err(backend)?;
        let () = redis::cmd("SET")
            .arg(key.as_str())
            .arg(payload)
            .arg("EX")
            .arg(expiry_seconds(ttl))
            .query_async(&mut *conn)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn evict(&self, key: &UserCacheKey) -> Result<(), UserCacheError> {
        let mut conn = self.pool.get().await.map_err(backend)?;
        let _removed: i64 = redis::cmd("DEL")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Serialisation coverage; live Redis behaviour is exercised by the
    //! in-memory double in service tests.
    use super::*;
    use crate::domain::{EmailAddress, Role, UserId, Username};
    use chrono::Utc;
    use rstest::rstest;

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::random(),
            username: Username::new("ada").expect("valid username"),
            email: EmailAddress::parse("ada@example.com").expect("valid email"),
            avatar: Some("https://images.test/ada.png".to_owned()),
            role: Role::User,
            confirmed: true,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn profile_survives_json_encoding() {
        let original = profile();
        let encoded = encode_profile(&original).expect("encode");

        assert_eq!(decode_profile(&encoded).expect("decode"), original);
        assert!(!encoded.contains("password"));
    }

    #[rstest]
    fn corrupt_entries_are_serialisation_errors() {
        let err = decode_profile("{not json").expect_err("corrupt");
        assert!(matches!(err, UserCacheError::Serialization { .. }));
    }

    #[rstest]
    #[case(Duration::from_millis(10), 1)]
    #[case(Duration::from_secs(900), 900)]
    fn expiry_never_drops_to_zero(#[case] ttl: Duration, #[case] expected: u64) {
        assert_eq!(expiry_seconds(ttl), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_backend_reports_backend_error() {
        use super::super::pool::RedisPoolConfig;

        let pool = RedisPool::new(
            RedisPoolConfig::new("redis://127.0.0.1:1")
                .with_max_size(1)
                .with_connection_timeout(Duration::from_millis(200)),
        )
        .expect("lazy pool");
        let cache = RedisUserCache::new(pool);
        let key = UserCacheKey::for_email(&profile().email);

        let err = cache.get(&key).await.expect_err("unreachable");
        assert!(matches!(err, UserCacheError::Backend { .. }));
    }
}
