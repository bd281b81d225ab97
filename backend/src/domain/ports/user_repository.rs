//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "user with email {email} already exists",
    }
}

/// Storage for user accounts.
///
/// Emails are compared in their normalised form, so adapters can rely on
/// exact matches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account and return the stored record.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Replace (or clear) the stored refresh token.
    async fn update_refresh_token(
        &self,
        id: &UserId,
        token: Option<String>,
    ) -> Result<(), UserPersistenceError>;

    /// Flag the account owning `email` as confirmed.
    async fn mark_confirmed(&self, email: &EmailAddress) -> Result<(), UserPersistenceError>;

    /// Store a new avatar URL and return the updated record.
    async fn update_avatar(
        &self,
        id: &UserId,
        avatar_url: &str,
    ) -> Result<Option<User>, UserPersistenceError>;
}
