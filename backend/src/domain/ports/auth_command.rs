//! Driving port for account registration and authentication use-cases.
//!
//! Inbound adapters call this port to sign users up, exchange credentials
//! for tokens and confirm email addresses without touching persistence,
//! hashing or token infrastructure directly.

use async_trait::async_trait;

use crate::domain::{
    ConfirmEmailOutcome, EmailAddress, EmailRequestOutcome, Error, LoginCredentials,
    SignupRequest, TokenPair, UserProfile,
};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthCommand: Send + Sync {
    /// Register a new account and return its public profile.
    async fn signup(&self, request: SignupRequest) -> Result<UserProfile, Error>;

    /// Exchange credentials for a fresh token pair.
    async fn login(&self, credentials: LoginCredentials) -> Result<TokenPair, Error>;

    /// Rotate tokens using a refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Error>;

    /// Confirm the email address carried by an email token.
    async fn confirm_email(&self, token: &str) -> Result<ConfirmEmailOutcome, Error>;

    /// Decide whether a new confirmation email should be sent to `email`.
    async fn request_confirmation(&self, email: &EmailAddress)
    -> Result<EmailRequestOutcome, Error>;

    /// Mail a confirmation link rooted at `base_url` to the profile owner.
    async fn send_confirmation(&self, profile: &UserProfile, base_url: &str) -> Result<(), Error>;
}
