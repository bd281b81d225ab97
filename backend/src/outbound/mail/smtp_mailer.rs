//! SMTP delivery of confirmation emails via `lettre` over STARTTLS.

use std::fmt;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{ConfirmationMailer, MailerError};
use crate::domain::{EmailAddress, Username};

/// Subject line of confirmation emails.
pub const CONFIRMATION_SUBJECT: &str = "Confirm your email";

/// Connection and sender settings for [`SmtpMailer`].
#[derive(Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: Zeroizing<String>,
    pub from_name: String,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_name", &self.from_name)
            .finish()
    }
}

/// Sends confirmation emails through an authenticated SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport. No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Message` when the sender address is invalid and
    /// `MailerError::Transport` when the relay host cannot be configured.
    pub fn new(settings: SmtpSettings) -> Result<Self, MailerError> {
        let from = sender(&settings.from_name, &settings.username)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)
            .map_err(|err| MailerError::transport(err.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.to_string(),
            ))
            .build();
        Ok(Self { transport, from })
    }
}

fn sender(name: &str, address: &str) -> Result<Mailbox, MailerError> {
    let address = address
        .parse()
        .map_err(|err: lettre::address::AddressError| MailerError::message(err.to_string()))?;
    Ok(Mailbox::new(Some(name.to_owned()), address))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// HTML body greeting `username` and linking to `link`.
pub fn render_confirmation(username: &Username, link: &str) -> String {
    let name = escape_html(username.as_str());
    let href = escape_html(link);
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <body>\n\
         <p>Hi {name},</p>\n\
         <p>Thanks for signing up to Contacts App. Please confirm your email address:</p>\n\
         <p><a href=\"{href}\">Confirm my email</a></p>\n\
         <p>If the button does not work, paste this link into your browser:<br>{href}</p>\n\
         </body>\n\
         </html>\n"
    )
}

fn build_message(
    from: &Mailbox,
    to: &EmailAddress,
    username: &Username,
    link: &str,
) -> Result<Message, MailerError> {
    let recipient = to
        .as_str()
        .parse()
        .map_err(|err: lettre::address::AddressError| MailerError::message(err.to_string()))?;
    Message::builder()
        .from(from.clone())
        .to(Mailbox::new(Some(username.as_str().to_owned()), recipient))
        .subject(CONFIRMATION_SUBJECT)
        .header(ContentType::TEXT_HTML)
        .body(render_confirmation(username, link))
        .map_err(|err| MailerError::message(err.to_string()))
}

#[async_trait]
impl ConfirmationMailer for SmtpMailer {
    async fn send_confirmation(
        &self,
        to: &EmailAddress,
        username: &Username,
        link: &str,
    ) -> Result<(), MailerError> {
        let message = build_message(&self.from, to, username, link)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|err| MailerError::transport(err.to_string()))?;
        debug!(code = %response.code(), "confirmation email accepted by relay");
        Ok(())
    }
}
