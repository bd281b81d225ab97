//! In-memory key-value doubles for the user cache and rate limiter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::UserProfile;
use crate::domain::ports::{
    RateLimiter, RateLimiterError, UserCache, UserCacheError, UserCacheKey,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("in-memory store mutex poisoned"),
    }
}

/// User cache that can be switched into a failing state.
#[derive(Default)]
pub struct InMemoryUserCache {
    entries: Mutex<HashMap<String, (UserProfile, Duration)>>,
    unavailable: AtomicBool,
}

impl InMemoryUserCache {
    /// Make every subsequent call fail with a backend error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Cached profile and TTL stored under `key`.
    pub fn entry(&self, key: &str) -> Option<(UserProfile, Duration)> {
        lock(&self.entries).get(key).cloned()
    }

    fn check(&self) -> Result<(), UserCacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(UserCacheError::backend("cache unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserCache for InMemoryUserCache {
    async fn get(&self, key: &UserCacheKey) -> Result<Option<UserProfile>, UserCacheError> {
        self.check()?;
        Ok(lock(&self.entries)
            .get(key.as_str())
            .map(|(profile, _)| profile.clone()))
    }

    async fn put(
        &self,
        key: &UserCacheKey,
        profile: &UserProfile,
        ttl: Duration,
    ) -> Result<(), UserCacheError> {
        self.check()?;
        lock(&self.entries).insert(key.as_str().to_owned(), (profile.clone(), ttl));
        Ok(())
    }

    async fn evict(&self, key: &UserCacheKey) -> Result<(), UserCacheError> {
        self.check()?;
        lock(&self.entries).remove(key.as_str());
        Ok(())
    }
}

/// Counter store without expiry; windows never roll over.
#[derive(Default)]
pub struct InMemoryRateLimiter {
    counters: Mutex<HashMap<String, u64>>,
    unavailable: AtomicBool,
}

impl InMemoryRateLimiter {
    /// Make every subsequent hit fail with a backend error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Forget all counters, as if every window had elapsed.
    pub fn reset(&self) {
        lock(&self.counters).clear();
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn hit(&self, key: &str, _window: Duration) -> Result<u64, RateLimiterError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RateLimiterError::backend("limiter unavailable"));
        }
        let mut counters = lock(&self.counters);
        let count = counters.entry(key.to_owned()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}
