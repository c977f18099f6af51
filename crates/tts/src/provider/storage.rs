use polyvox_core::GoogleCredentials;
use reqwest::{Client, Url};

use crate::error::TtsError;

const DEFAULT_STORAGE_URL: &str = "https://storage.googleapis.com";

/// Reads long-audio output back out of Cloud Storage
pub(crate) struct StorageClient {
    client: Client,
    base_url: String,
    credentials: GoogleCredentials,
}

impl StorageClient {
    pub fn new(client: Client, credentials: GoogleCredentials, base_url: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_STORAGE_URL.to_string()),
            credentials,
        }
    }

    /// Download `object` from `bucket`
    pub async fn download(&self, bucket: &str, object: &str) -> crate::error::Result<Vec<u8>> {
        let url = self.object_url(bucket, object)?;
        let (header, value) = self
            .credentials
            .header()
            .map_err(|e| TtsError::ConfigMissing(format!("unusable Google credential: {e}")))?;

        tracing::debug!("Downloading gs://{bucket}/{object}");

        let response = self
            .client
            .get(url)
            .header(header, value)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Cloud Storage request failed: {e}");
                TtsError::ConnectionError(format!("Failed to send request to Cloud Storage: {e}"))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!("Cloud Storage error ({status}): {error_text}");

            return Err(match status.as_u16() {
                401 | 403 => TtsError::AuthenticationFailed(error_text),
                429 => TtsError::QuotaExceeded(error_text),
                s if s >= 500 => TtsError::ServiceUnavailable(error_text),
                _ => TtsError::OperationFailed(format!("synthesized audio could not be downloaded: {error_text}")),
            });
        }

        let audio = response.bytes().await.map_err(|e| {
            tracing::error!("Failed to read Cloud Storage response body: {e}");
            TtsError::ConnectionError(format!("Failed to read synthesized audio: {e}"))
        })?;

        tracing::debug!("Downloaded {} bytes of synthesized audio", audio.len());

        Ok(audio.to_vec())
    }

    // Object names contain '/', which must be escaped inside the path segment
    fn object_url(&self, bucket: &str, object: &str) -> crate::error::Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| TtsError::ConfigMissing(format!("invalid storage endpoint '{}': {e}", self.base_url)))?;

        url.path_segments_mut()
            .map_err(|()| TtsError::ConfigMissing(format!("invalid storage endpoint '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", bucket, "o", object]);
        url.query_pairs_mut().append_pair("alt", "media");

        Ok(url)
    }
}
