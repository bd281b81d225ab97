//! Account and token domain service.
//!
//! Implements [`AuthCommand`] on top of the user repository, the user cache,
//! a token service, a password hasher and a confirmation mailer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AuthCommand, ConfirmationMailer, CredentialHasher, TokenService, UserCache, UserCacheKey,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, Error, LoginCredentials, NewUser, Role, SignupRequest, TokenPair, TokenScope,
    User, UserId, UserProfile, gravatar_url,
};

const DUPLICATE_ACCOUNT: &str = "User with this email already exists";
const INVALID_EMAIL: &str = "Invalid email";
const EMAIL_NOT_CONFIRMED: &str = "Email not confirmed";
const INVALID_PASSWORD: &str = "Invalid password";
const INVALID_CREDENTIALS: &str = "Unable validate credentials";
const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";
const INVALID_EMAIL_TOKEN: &str = "Invalid token for email verification";
const VERIFICATION_ERROR: &str = "Email verification error";

/// Result of following a confirmation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmEmailOutcome {
    /// The account has just been confirmed.
    Confirmed,
    /// The account was confirmed earlier.
    AlreadyConfirmed,
}

impl ConfirmEmailOutcome {
    /// Message reported to the client.
    pub fn message(self) -> &'static str {
        match self {
            Self::Confirmed => "Email confirmed successfully",
            Self::AlreadyConfirmed => "Email already confirmed",
        }
    }
}

/// Result of asking for a new confirmation email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailRequestOutcome {
    /// Nothing to send; the account is confirmed.
    AlreadyConfirmed,
    /// A confirmation email should be sent to this profile.
    Send(UserProfile),
    /// No account uses the address.
    UnknownEmail,
}

impl EmailRequestOutcome {
    /// Message reported to the client.
    pub fn message(&self) -> &'static str {
        match self {
            Self::AlreadyConfirmed => "Email already confirmed",
            Self::Send(_) => "Email confirmation sent successfully",
            Self::UnknownEmail => "User with this email does not exist",
        }
    }
}

/// Authentication service implementing the [`AuthCommand`] driving port.
#[derive(Clone)]
pub struct AuthService<U, C, T, H, M> {
    users: Arc<U>,
    cache: Arc<C>,
    tokens: Arc<T>,
    hasher: Arc<H>,
    mailer: Arc<M>,
}

impl<U, C, T, H, M> AuthService<U, C, T, H, M> {
    /// Create a new service from its collaborators.
    pub fn new(
        users: Arc<U>,
        cache: Arc<C>,
        tokens: Arc<T>,
        hasher: Arc<H>,
        mailer: Arc<M>,
    ) -> Self {
        Self {
            users,
            cache,
            tokens,
            hasher,
            mailer,
        }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => Error::conflict(DUPLICATE_ACCOUNT),
    }
}

fn confirmation_link(base_url: &str, token: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/api/auth/confirmed_email/{token}")
}

impl<U, C, T, H, M> AuthService<U, C, T, H, M>
where
    U: UserRepository,
    C: UserCache,
    T: TokenService,
    H: CredentialHasher,
    M: ConfirmationMailer,
{
    async fn find_user(&self, email: &EmailAddress) -> Result<Option<User>, Error> {
        self.users
            .find_by_email(email)
            .await
            .map_err(map_user_error)
    }

    async fn store_refresh_token(&self, id: &UserId, token: Option<String>) -> Result<(), Error> {
        self.users
            .update_refresh_token(id, token)
            .await
            .map_err(map_user_error)
    }

    fn issue(&self, subject: &EmailAddress, scope: TokenScope) -> Result<String, Error> {
        self.tokens
            .issue(subject, scope)
            .map_err(|err| Error::internal(format!("token issuance failed: {err}")))
    }

    async fn rotate_tokens(&self, user: &User) -> Result<TokenPair, Error> {
        let access_token = self.issue(&user.email, TokenScope::AccessToken)?;
        let refresh_token = self.issue(&user.email, TokenScope::RefreshToken)?;
        self.store_refresh_token(&user.id, Some(refresh_token.clone()))
            .await?;
        Ok(TokenPair::bearer(access_token, refresh_token))
    }
}

#[async_trait]
impl<U, C, T, H, M> AuthCommand for AuthService<U, C, T, H, M>
where
    U: UserRepository,
    C: UserCache,
    T: TokenService,
    H: CredentialHasher,
    M: ConfirmationMailer,
{
    async fn signup(&self, request: SignupRequest) -> Result<UserProfile, Error> {
        if self.find_user(request.email()).await?.is_some() {
            return Err(Error::conflict(DUPLICATE_ACCOUNT));
        }

        let password_hash = self
            .hasher
            .hash(request.password())
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;
        let new_user = NewUser {
            id: UserId::random(),
            username: request.username().clone(),
            email: request.email().clone(),
            password_hash,
            avatar: Some(gravatar_url(request.email())),
            role: Role::default(),
        };
        let user = self.users.create(&new_user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, "account created");
        Ok(user.profile())
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<TokenPair, Error> {
        let user = self
            .find_user(credentials.email())
            .await?
            .ok_or_else(|| Error::unauthorized(INVALID_EMAIL))?;
        if !user.confirmed {
            return Err(Error::unauthorized(EMAIL_NOT_CONFIRMED));
        }
        let matches = self
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .map_err(|err| Error::internal(format!("password verification failed: {err}")))?;
        if !matches {
            return Err(Error::unauthorized(INVALID_PASSWORD));
        }
        self.rotate_tokens(&user).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Error> {
        let email = self
            .tokens
            .verify(refresh_token, TokenScope::RefreshToken)
            .map_err(|err| {
                debug!(error = %err, "refresh token rejected");
                Error::unauthorized(INVALID_CREDENTIALS)
            })?;
        let user = self
            .find_user(&email)
            .await?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;

        if user.refresh_token.as_deref() != Some(refresh_token) {
            warn!(user_id = %user.id, "stale refresh token presented; revoking");
            self.store_refresh_token(&user.id, None).await?;
            return Err(Error::unauthorized(INVALID_REFRESH_TOKEN));
        }
        self.rotate_tokens(&user).await
    }

    async fn confirm_email(&self, token: &str) -> Result<ConfirmEmailOutcome, Error> {
        let email = self
            .tokens
            .verify(token, TokenScope::EmailToken)
            .map_err(|err| {
                debug!(error = %err, "email token rejected");
                Error::invalid_request(INVALID_EMAIL_TOKEN)
            })?;
        let user = self
            .find_user(&email)
            .await?
            .ok_or_else(|| Error::invalid_request(VERIFICATION_ERROR))?;
        if user.confirmed {
            return Ok(ConfirmEmailOutcome::AlreadyConfirmed);
        }

        self.users
            .mark_confirmed(&email)
            .await
            .map_err(map_user_error)?;
        if let Err(err) = self.cache.evict(&UserCacheKey::for_email(&email)).await {
            warn!(error = %err, "failed to evict cached profile after confirmation");
        }
        info!(user_id = %user.id, "email confirmed");
        Ok(ConfirmEmailOutcome::Confirmed)
    }

    async fn request_confirmation(
        &self,
        email: &EmailAddress,
    ) -> Result<EmailRequestOutcome, Error> {
        Ok(match self.find_user(email).await? {
            None => EmailRequestOutcome::UnknownEmail,
            Some(user) if user.confirmed => EmailRequestOutcome::AlreadyConfirmed,
            Some(user) => EmailRequestOutcome::Send(user.profile()),
        })
    }

    async fn send_confirmation(&self, profile: &UserProfile, base_url: &str) -> Result<(), Error> {
        let token = self.issue(&profile.email, TokenScope::EmailToken)?;
        let link = confirmation_link(base_url, &token);
        self.mailer
            .send_confirmation(&profile.email, &profile.username, &link)
            .await
            .map_err(|err| Error::service_unavailable(err.to_string()))
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
