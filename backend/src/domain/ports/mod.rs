//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, cache, tokens, hashing, mail, image host,
//! rate limiting) describe what the domain needs from infrastructure. Each
//! exposes a `define_port_error!` enum so adapters map their failures into
//! predictable variants. Driving ports (`AuthCommand`, `CurrentUserQuery`,
//! `ProfileCommand`, `ContactsCommand`, `ContactsQuery`) are what inbound
//! adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_command;
mod avatar_store;
mod cache_key;
mod confirmation_mailer;
mod contact_repository;
mod contacts_command;
mod contacts_query;
mod credential_hasher;
mod current_user_query;
mod database_probe;
mod profile_command;
mod rate_limiter;
mod token_service;
mod user_cache;
mod user_repository;

pub use auth_command::AuthCommand;
#[cfg(test)]
pub use auth_command::MockAuthCommand;
#[cfg(test)]
pub use avatar_store::MockAvatarStore;
pub use avatar_store::{AvatarStore, AvatarStoreError, AvatarUpload};
pub use cache_key::{USER_CACHE_PREFIX, UserCacheKey, UserCacheKeyValidationError};
pub use confirmation_mailer::{ConfirmationMailer, MailerError};
#[cfg(test)]
pub use confirmation_mailer::MockConfirmationMailer;
#[cfg(test)]
pub use contact_repository::MockContactRepository;
pub use contact_repository::{ContactRepository, ContactRepositoryError};
pub use contacts_command::ContactsCommand;
#[cfg(test)]
pub use contacts_command::MockContactsCommand;
pub use contacts_query::ContactsQuery;
#[cfg(test)]
pub use contacts_query::MockContactsQuery;
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher};
pub use current_user_query::CurrentUserQuery;
#[cfg(test)]
pub use current_user_query::MockCurrentUserQuery;
#[cfg(test)]
pub use database_probe::MockDatabaseProbe;
pub use database_probe::{DatabaseProbe, DatabaseProbeError, FixtureDatabaseProbe};
#[cfg(test)]
pub use profile_command::MockProfileCommand;
pub use profile_command::ProfileCommand;
#[cfg(test)]
pub use rate_limiter::MockRateLimiter;
pub use rate_limiter::{RateLimiter, RateLimiterError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_cache::MockUserCache;
pub use user_cache::{UserCache, UserCacheError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
