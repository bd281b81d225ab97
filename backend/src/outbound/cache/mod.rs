//! Redis adapters for the user cache and the request rate limiter.
//!
//! Both share one `bb8-redis` pool. Keys are namespaced (`user:<email>`,
//! `rate:<ip>:<path>`) so the two never collide.

mod pool;
mod redis_rate_limiter;
mod redis_user_cache;

pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError};
pub use redis_rate_limiter::RedisRateLimiter;
pub use redis_user_cache::RedisUserCache;
