//! Redis connection pool built on `bb8-redis`.
//!
//! The pool is built lazily so the server starts while Redis is down; the
//! adapters then report backend errors per call and callers degrade.

use std::time::Duration;

use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};

/// Errors raised while building or using the Redis pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedisPoolError {
    /// The connection URL was rejected.
    #[error("invalid redis configuration: {message}")]
    Config { message: String },

    /// No connection could be checked out in time.
    #[error("failed to get redis connection: {message}")]
    Checkout { message: String },
}

/// Pool sizing and timeouts.
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl RedisPoolConfig {
    /// Defaults: 16 connections, 2 second checkout timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_size: 16,
            connection_timeout: Duration::from_secs(2),
        }
    }

    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Shared handle to the Redis pool.
#[derive(Clone)]
pub struct RedisPool {
    inner: Pool<RedisConnectionManager>,
}

impl RedisPool {
    /// Build the pool without opening connections.
    ///
    /// # Errors
    ///
    /// Returns `RedisPoolError::Config` when the URL cannot be parsed.
    pub fn new(config: RedisPoolConfig) -> Result<Self, RedisPoolError> {
        let manager = RedisConnectionManager::new(config.url.as_str()).map_err(|err| {
            RedisPoolError::Config {
                message: err.to_string(),
            }
        })?;
        let inner = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build_unchecked(manager);
        Ok(Self { inner })
    }

    /// Check out a multiplexed connection.
    pub async fn get(&self) -> Result<PooledConnection<'_, RedisConnectionManager>, RedisPoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| RedisPoolError::Checkout {
                message: err.to_string(),
            })
    }
}
