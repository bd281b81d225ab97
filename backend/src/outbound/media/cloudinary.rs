//! Reqwest-backed Cloudinary upload adapter.
//!
//! Performs a signed multipart upload to the Cloudinary upload API and
//! returns the `secure_url` of the stored image. Signing follows Cloudinary's
//! scheme: the sorted `key=value` parameters joined with `&`, followed by
//! the API secret, hashed with SHA-256.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::ports::{AvatarStore, AvatarStoreError, AvatarUpload};

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1/";
const BODY_PREVIEW_LIMIT: usize = 200;

/// Account credentials for the upload API.
#[derive(Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: Zeroizing<String>,
}

impl fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Image host adapter uploading avatars to Cloudinary.
pub struct CloudinaryAvatarStore {
    client: Client,
    endpoint: Url,
    credentials: CloudinaryCredentials,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryAvatarStore {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AvatarStoreError::Unavailable` when the endpoint URL cannot be
    /// formed or the HTTP client cannot be constructed.
    pub fn new(
        credentials: CloudinaryCredentials,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AvatarStoreError> {
        let endpoint = upload_endpoint(DEFAULT_API_BASE, &credentials.cloud_name)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AvatarStoreError::unavailable(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            credentials,
            clock,
        })
    }
}

fn upload_endpoint(base: &str, cloud_name: &str) -> Result<Url, AvatarStoreError> {
    Url::parse(base)
        .and_then(|base| base.join(&format!("{cloud_name}/image/upload")))
        .map_err(|err| AvatarStoreError::unavailable(format!("invalid upload endpoint: {err}")))
}

/// Hex SHA-256 signature over `params` (sorted by key) and `secret`.
pub(crate) fn sign(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);
    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    hex::encode(Sha256::digest(format!("{joined}{secret}").as_bytes()))
}

fn map_transport_error(error: reqwest::Error) -> AvatarStoreError {
    AvatarStoreError::unavailable(error.to_string())
}

fn body_preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(BODY_PREVIEW_LIMIT)
        .collect::<String>()
        .trim()
        .to_owned()
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AvatarStoreError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };
    if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
        AvatarStoreError::rejected(message)
    } else {
        AvatarStoreError::unavailable(message)
    }
}

fn parse_secure_url(body: &[u8]) -> Result<String, AvatarStoreError> {
    serde_json::from_slice::<UploadResponse>(body)
        .map(|response| response.secure_url)
        .map_err(|err| AvatarStoreError::unavailable(format!("invalid upload response: {err}")))
}

#[async_trait]
impl AvatarStore for CloudinaryAvatarStore {
    async fn upload(
        &self,
        public_id: &str,
        image: &AvatarUpload,
    ) -> Result<String, AvatarStoreError> {
        let timestamp = self.clock.utc().timestamp().to_string();
        let signed = [
            ("overwrite", "true".to_owned()),
            ("public_id", public_id.to_owned()),
            ("timestamp", timestamp.clone()),
        ];
        let signature = sign(&signed, &self.credentials.api_secret);

        let mut part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        if let Some(content_type) = image.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|err| AvatarStoreError::rejected(err.to_string()))?;
        }
        let form = Form::new()
            .text("api_key", self.credentials.api_key.clone())
            .text("timestamp", timestamp)
            .text("public_id", public_id.to_owned())
            .text("overwrite", "true")
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_secure_url(body.as_ref())
    }
}
