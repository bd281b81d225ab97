//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use contacts_backend::AppSettings;
use contacts_backend::middleware::{AccessRules, RateLimitPolicy};
use contacts_backend::outbound::cache::RedisPool;
use contacts_backend::outbound::mail::SmtpSettings;
use contacts_backend::outbound::media::CloudinaryCredentials;
use contacts_backend::outbound::persistence::DbPool;
use contacts_backend::outbound::security::TokenLifetimes;
use contacts_backend::settings::SettingsError;
use jsonwebtoken::Algorithm;
use zeroize::Zeroizing;

/// Signing material for the token service.
#[derive(Clone)]
pub struct TokenConfig {
    pub(crate) secret: Zeroizing<String>,
    pub(crate) algorithm: Algorithm,
    pub(crate) lifetimes: TokenLifetimes,
}

/// Resolved configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) access_rules: AccessRules,
    pub(crate) rate_limit: RateLimitPolicy,
    pub(crate) cache_ttl: Duration,
    pub(crate) tokens: TokenConfig,
    pub(crate) smtp: SmtpSettings,
    pub(crate) cloudinary: CloudinaryCredentials,
    pub(crate) upload_timeout: Duration,
    pub(crate) db_pool: DbPool,
    pub(crate) redis_pool: RedisPool,
}

impl ServerConfig {
    /// Resolve every setting the server needs up front so a misconfigured
    /// deployment fails before binding.
    ///
    /// # Errors
    /// Returns the first [`SettingsError`] raised while resolving values.
    pub fn from_settings(
        settings: &AppSettings,
        db_pool: DbPool,
        redis_pool: RedisPool,
    ) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            access_rules: settings.access_rules()?,
            rate_limit: settings.rate_limit_policy(),
            cache_ttl: settings.cache_ttl(),
            tokens: TokenConfig {
                secret: settings.jwt_secret()?,
                algorithm: settings.jwt_algorithm()?,
                lifetimes: settings.token_lifetimes(),
            },
            smtp: settings.smtp_settings()?,
            cloudinary: settings.cloudinary_credentials()?,
            upload_timeout: settings.upload_timeout(),
            db_pool,
            redis_pool,
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
