//! Port for issuing and verifying signed bearer tokens.
//!
//! Tokens carry the account email as subject and a [`TokenScope`] claim.
//! Verification fails unless the scope matches the one requested, so an
//! email-confirmation token can never be replayed as an access token.

use crate::domain::{EmailAddress, TokenScope};

use super::define_port_error;

define_port_error! {
    /// Errors raised while signing or verifying tokens.
    pub enum TokenError {
        /// Signature, structure or claims are invalid.
        Invalid { message: String } => "token is invalid: {message}",
        /// The `exp` claim is in the past.
        Expired => "token has expired",
        /// The token was issued for another purpose.
        WrongScope { expected: String } => "token scope must be {expected}",
        /// Encoding the token failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token for `subject` with the lifetime configured for `scope`.
    fn issue(&self, subject: &EmailAddress, scope: TokenScope) -> Result<String, TokenError>;

    /// Verify `token` and return its subject when it carries `scope`.
    fn verify(&self, token: &str, scope: TokenScope) -> Result<EmailAddress, TokenError>;
}
