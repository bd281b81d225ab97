//! Fixed-window request counter on Redis.
//!
//! Each hit runs `SET key 0 EX window NX` and `INCR key` inside one
//! `MULTI`/`EXEC`, so a window key never exists without an expiry.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis;

use crate::domain::ports::{RateLimiter, RateLimiterError};

use super::pool::RedisPool;

/// Counts hits per key; the first hit in a window creates the key with its
/// expiry.
#[derive(Clone)]
pub struct RedisRateLimiter {
    pool: RedisPool,
}

impl RedisRateLimiter {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

fn backend(err: impl ToString) -> RateLimiterError {
    RateLimiterError::backend(err.to_string())
}

fn hit_pipeline(key: &str, window: Duration) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("EX")
        .arg(window.as_secs().max(1))
        .arg("NX")
        .ignore()
        .cmd("INCR")
        .arg(key);
    pipe
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn hit(&self, key: &str, window: Duration) -> Result<u64, RateLimiterError> {
        let mut conn = self.pool.get().await.map_err(backend)?;
        let (count,): (u64,) = hit_pipeline(key, window)
            .query_async(&mut *conn)
            .await
            .map_err(backend)?;
        Ok(count)
    }
}
