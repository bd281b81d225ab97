//! Authentication primitives: signup and login payloads, token scopes and
//! issued token pairs.
//!
//! Inbound adapters call the `try_from_parts` constructors so only validated
//! values ever reach a port or service.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::{EmailAddress, EmailValidationError, USER_EMAIL_MAX, UserValidationError, Username};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;
/// Maximum accepted password length.
pub const PASSWORD_MAX: usize = 128;

/// Validation failures for signup and login payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    /// Username failed validation.
    #[error(transparent)]
    Username(#[from] UserValidationError),
    /// Email failed validation.
    #[error(transparent)]
    Email(#[from] EmailValidationError),
    /// Email is longer than the user table allows.
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password length is outside the accepted bounds.
    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
}

impl AuthValidationError {
    /// Name of the payload field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Username(_) => "username",
            Self::Email(_) | Self::EmailTooLong { .. } => "email",
            Self::EmptyPassword | Self::PasswordLength { .. } => "password",
        }
    }
}

fn parse_user_email(raw: &str) -> Result<EmailAddress, AuthValidationError> {
    let email = EmailAddress::parse(raw)?;
    if email.len() > USER_EMAIL_MAX {
        return Err(AuthValidationError::EmailTooLong {
            max: USER_EMAIL_MAX,
        });
    }
    Ok(email)
}

/// Validated signup payload.
///
/// # Examples
/// ```
/// use contacts_backend::domain::SignupRequest;
///
/// let request = SignupRequest::try_from_parts("ada", "Ada@example.com", "secret1").unwrap();
/// assert_eq!(request.email().as_str(), "ada@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SignupRequest {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl SignupRequest {
    /// Validate raw signup inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, AuthValidationError> {
        let username = Username::new(username)?;
        let email = parse_user_email(email)?;
        let length = password.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(AuthValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Requested username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Normalised email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plain-text password, zeroed on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is normalised exactly like stored user emails.
/// - `password` is non-empty but otherwise kept verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = EmailAddress::parse(email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Purpose a token was issued for. Carried in the `scope` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    /// Short-lived bearer token for API calls.
    AccessToken,
    /// Long-lived token exchanged for a new pair.
    RefreshToken,
    /// Token embedded in confirmation emails.
    EmailToken,
}

impl TokenScope {
    /// Claim value for this scope.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::EmailToken => "email_token",
        }
    }
}

/// Access and refresh tokens returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
}

impl TokenPair {
    /// Build a bearer token pair.
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_owned(),
        }
    }
}
