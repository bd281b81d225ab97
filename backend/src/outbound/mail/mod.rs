//! Outbound email.

mod smtp_mailer;

pub use smtp_mailer::{CONFIRMATION_SUBJECT, SmtpMailer, SmtpSettings, render_confirmation};
