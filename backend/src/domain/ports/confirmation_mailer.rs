//! Port for delivering email-confirmation messages.
use async_trait::async_trait;

use crate::domain::{EmailAddress, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail adapters.
    pub enum MailerError {
        /// The message could not be assembled.
        Message { message: String } => "confirmation email could not be built: {message}",
        /// The transport rejected the message or was unreachable.
        Transport { message: String } => "confirmation email delivery failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    /// Send `link` to `to`, greeting the recipient by `username`.
    async fn send_confirmation(
        &self,
        to: &EmailAddress,
        username: &Username,
        link: &str,
    ) -> Result<(), MailerError>;
}
