//! Port for storing avatar images with an external image host.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by avatar storage adapters.
    pub enum AvatarStoreError {
        /// The image host could not be reached.
        Unavailable { message: String } => "image host unavailable: {message}",
        /// The image host refused the upload.
        Rejected { message: String } => "image host rejected upload: {message}",
    }
}

/// Raw image received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AvatarUpload {
    /// True when no bytes were received.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Upload `image` under `public_id`, replacing any previous image, and
    /// return its public HTTPS URL.
    async fn upload(&self, public_id: &str, image: &AvatarUpload)
    -> Result<String, AvatarStoreError>;
}
