//! Builders wiring outbound adapters into the domain services behind the
//! HTTP state ports.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use contacts_backend::domain::ports::RateLimiter;
use contacts_backend::domain::{AuthService, ContactsService, CurrentUserService, ProfileService};
use contacts_backend::inbound::http::state::{HttpState, HttpStatePorts};
use contacts_backend::outbound::cache::{RedisRateLimiter, RedisUserCache};
use contacts_backend::outbound::mail::SmtpMailer;
use contacts_backend::outbound::media::CloudinaryAvatarStore;
use contacts_backend::outbound::persistence::{
    DieselContactRepository, DieselDatabaseProbe, DieselUserRepository,
};
use contacts_backend::outbound::security::{Argon2Hasher, JwtTokenService};

use super::ServerConfig;

/// Handler state plus the limiter shared by the rate-limited scopes.
pub(crate) struct AppPorts {
    pub(crate) http_state: web::Data<HttpState>,
    pub(crate) rate_limiter: Arc<dyn RateLimiter>,
}

/// Build every port from the configured pools and credentials.
///
/// # Errors
/// Returns [`std::io::Error`] when the mail transport or the image host client
/// cannot be constructed.
pub(crate) fn build_app_ports(config: &ServerConfig) -> std::io::Result<AppPorts> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let users = Arc::new(DieselUserRepository::new(config.db_pool.clone()));
    let contacts_repo = Arc::new(DieselContactRepository::new(config.db_pool.clone()));
    let cache = Arc::new(RedisUserCache::new(config.redis_pool.clone()));
    let tokens = Arc::new(JwtTokenService::new(
        config.tokens.secret.clone(),
        config.tokens.algorithm,
        config.tokens.lifetimes,
        Arc::clone(&clock),
    ));
    let mailer = SmtpMailer::new(config.smtp.clone())
        .map_err(|e| std::io::Error::other(format!("mail transport setup failed: {e}")))?;
    let avatars = CloudinaryAvatarStore::new(
        config.cloudinary.clone(),
        config.upload_timeout,
        Arc::clone(&clock),
    )
    .map_err(|e| std::io::Error::other(format!("image host client setup failed: {e}")))?;

    let auth = AuthService::new(
        Arc::clone(&users),
        Arc::clone(&cache),
        Arc::clone(&tokens),
        Arc::new(Argon2Hasher::default()),
        Arc::new(mailer),
    );
    let current_user = CurrentUserService::new(
        Arc::clone(&users),
        Arc::clone(&cache),
        tokens,
        config.cache_ttl,
    );
    let profile = ProfileService::new(users, cache, Arc::new(avatars), config.cache_ttl);
    let contacts = Arc::new(ContactsService::new(contacts_repo, clock));

    let http_state = HttpState::new(HttpStatePorts {
        auth: Arc::new(auth),
        current_user: Arc::new(current_user),
        profile: Arc::new(profile),
        contacts: contacts.clone(),
        contacts_query: contacts,
        database: Arc::new(DieselDatabaseProbe::new(config.db_pool.clone())),
    });

    Ok(AppPorts {
        http_state: web::Data::new(http_state),
        rate_limiter: Arc::new(RedisRateLimiter::new(config.redis_pool.clone())),
    })
}
