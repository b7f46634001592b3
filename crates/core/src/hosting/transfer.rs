//! HTTP byte-transfer target implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_LENGTH;
use reqwest::Client;
use tracing::debug;

use super::types::HostingError;
use super::ByteTransfer;

/// Sends upload bytes to the signed URL with a single PUT request.
pub struct HttpByteTransfer {
    client: Client,
    /// Hard per-attempt timeout; an abort surfaces as a transient timeout.
    attempt_timeout: Duration,
}

impl HttpByteTransfer {
    /// Create a new transfer target with the given per-attempt timeout.
    pub fn new(attempt_timeout: Duration) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            attempt_timeout,
        }
    }
}

#[async_trait]
impl ByteTransfer for HttpByteTransfer {
    async fn put(&self, url: &str, body: Bytes) -> Result<(), HostingError> {
        let content_length = body.len() as u64;

        let response = self
            .client
            .put(url)
            .header(CONTENT_LENGTH, content_length)
            .timeout(self.attempt_timeout)
            .body(body)
            .send()
            .await
            .map_err(HostingError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HostingError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect::<String>(),
            });
        }

        // Drain the body so the pooled connection can be reused.
        let _ = response.bytes().await;

        debug!(content_length, "Byte transfer complete");
        Ok(())
    }
}
