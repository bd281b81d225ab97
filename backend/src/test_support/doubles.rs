//! Recording and stub doubles for hashing, mail and the image host.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    AvatarStore, AvatarStoreError, AvatarUpload, ConfirmationMailer, CredentialHashError,
    CredentialHasher, MailerError,
};
use crate::domain::{EmailAddress, Username};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}

const PLAIN_PREFIX: &str = "plain$";

/// Reversible "hasher" so tests avoid the cost of real key stretching.
#[derive(Debug, Default, Clone, Copy)]
pub struct InsecureTestHasher;

impl CredentialHasher for InsecureTestHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialHashError> {
        Ok(format!("{PLAIN_PREFIX}{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHashError> {
        hash.strip_prefix(PLAIN_PREFIX)
            .map(|stored| stored == password)
            .ok_or_else(|| CredentialHashError::malformed_hash("missing test prefix"))
    }
}

/// A confirmation email captured by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentConfirmation {
    pub to: String,
    pub username: String,
    pub link: String,
}

impl SentConfirmation {
    /// Token at the end of the confirmation link.
    pub fn token(&self) -> &str {
        self.link.rsplit('/').next().unwrap_or_default()
    }
}

/// Mailer that stores messages instead of sending them.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentConfirmation>>,
}

impl RecordingMailer {
    /// Messages captured so far.
    pub fn sent(&self) -> Vec<SentConfirmation> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl ConfirmationMailer for RecordingMailer {
    async fn send_confirmation(
        &self,
        to: &EmailAddress,
        username: &Username,
        link: &str,
    ) -> Result<(), MailerError> {
        lock(&self.sent).push(SentConfirmation {
            to: to.as_str().to_owned(),
            username: username.as_str().to_owned(),
            link: link.to_owned(),
        });
        Ok(())
    }
}

/// Image host double returning deterministic URLs.
#[derive(Default)]
pub struct StubAvatarStore {
    uploads: Mutex<Vec<(String, usize)>>,
}

impl StubAvatarStore {
    /// `(public_id, byte_count)` for each upload received.
    pub fn uploads(&self) -> Vec<(String, usize)> {
        lock(&self.uploads).clone()
    }
}

#[async_trait]
impl AvatarStore for StubAvatarStore {
    async fn upload(
        &self,
        public_id: &str,
        image: &AvatarUpload,
    ) -> Result<String, AvatarStoreError> {
        lock(&self.uploads).push((public_id.to_owned(), image.bytes.len()));
        Ok(format!("https://images.test/{public_id}.png"))
    }
}
