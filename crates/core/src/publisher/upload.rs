//! Upload coordination: session creation, byte transfer, retry policy.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::hosting::{ByteTransfer, HostingApi, HostingError, NewUploadOptions, UploadSession};

use super::classify::{classify, ErrorClass};
use super::config::PublisherConfig;

/// Result of a completed upload.
#[derive(Debug, Clone)]
pub struct PublishedUpload {
    /// Asset identifier (or the upload id standing in for one).
    pub asset_id: String,
    /// Platform upload session identifier.
    pub upload_id: String,
    /// True when `asset_id` is the upload id standing in for an asset the
    /// platform never linked. A readiness check against such an identifier
    /// may never turn ready.
    pub asset_id_is_fallback: bool,
    /// Bytes transferred to the platform.
    pub bytes_sent: u64,
}

/// Errors surfaced by a publish attempt.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create upload session: {0}")]
    SessionCreation(#[source] HostingError),

    #[error("Upload failed after {attempts} attempt(s): {last_error}")]
    TransferFailed { attempts: u32, last_error: String },
}

impl UploadError {
    /// Build the user-facing message for a failed publish.
    ///
    /// Matches on the failure text only; retry decisions never look here.
    pub fn user_message(&self) -> &'static str {
        let detail = self.to_string().to_lowercase();
        let contains_any = |needles: &[&str]| needles.iter().any(|n| detail.contains(n));

        if contains_any(&["connection", "connect", "timeout", "authentication", "credential"]) {
            "Could not reach the video host. Check the network and hosting credentials."
        } else if contains_any(&["malformed", "parse", "json", "unexpected response"]) {
            "The video host returned an unexpected response. Please try again shortly."
        } else {
            "The video upload failed. Please try again shortly."
        }
    }
}

/// Creates a remote upload session, transfers the file's bytes to it and
/// resolves the resulting asset identifier.
pub struct UploadCoordinator {
    hosting: Arc<dyn HostingApi>,
    transfer: Arc<dyn ByteTransfer>,
    max_attempts: u32,
    base_delay: Duration,
}

impl UploadCoordinator {
    /// Create a new coordinator.
    pub fn new(
        hosting: Arc<dyn HostingApi>,
        transfer: Arc<dyn ByteTransfer>,
        config: &PublisherConfig,
    ) -> Self {
        let config = config.normalized();
        Self {
            hosting,
            transfer,
            max_attempts: config.upload_max_attempts,
            base_delay: config.upload_base_delay(),
        }
    }

    /// Publish a local media file, returning its asset identifier.
    pub async fn publish(
        &self,
        local_file: &Path,
        options: &NewUploadOptions,
    ) -> Result<PublishedUpload, UploadError> {
        let session = self
            .hosting
            .create_upload(options)
            .await
            .map_err(UploadError::SessionCreation)?;

        let UploadSession {
            upload_id,
            upload_url,
            asset_id,
        } = session;
        debug!(upload_id = %upload_id, "Upload session created");

        let contents = tokio::fs::read(local_file)
            .await
            .map_err(|source| UploadError::FileRead {
                path: local_file.to_path_buf(),
                source,
            })?;
        let bytes_sent = contents.len() as u64;

        self.transfer_with_retry(&upload_url, Bytes::from(contents))
            .await?;

        let (asset_id, asset_id_is_fallback) = match asset_id {
            Some(id) => (id, false),
            None => self.lookup_asset_id(&upload_id).await,
        };

        info!(
            asset_id = %asset_id,
            upload_id = %upload_id,
            bytes_sent,
            fallback = asset_id_is_fallback,
            "Upload complete"
        );

        Ok(PublishedUpload {
            asset_id,
            upload_id,
            asset_id_is_fallback,
            bytes_sent,
        })
    }

    /// Resolve the asset linked to an upload session, falling back to the
    /// upload id itself when the platform has nothing better.
    async fn lookup_asset_id(&self, upload_id: &str) -> (String, bool) {
        match self.hosting.resolve_asset_id(upload_id).await {
            Ok(Some(asset_id)) => (asset_id, false),
            Ok(None) => {
                warn!(
                    upload_id,
                    "Upload not linked to an asset yet; using the upload id as identifier"
                );
                (upload_id.to_string(), true)
            }
            Err(e) => {
                warn!(
                    upload_id,
                    "Asset lookup failed ({}); using the upload id as identifier", e
                );
                (upload_id.to_string(), true)
            }
        }
    }

    async fn transfer_with_retry(&self, url: &str, body: Bytes) -> Result<(), UploadError> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            match self.transfer.put(url, body.clone()).await {
                Ok(()) => {
                    debug!(attempt, "Byte transfer succeeded");
                    return Ok(());
                }
                Err(e) if classify(&e) == ErrorClass::Fatal => {
                    return Err(UploadError::TransferFailed {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < self.max_attempts {
                        let delay = self.base_delay * 2u32.saturating_pow(attempt - 1);
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "Transient transfer failure, retrying: {}",
                            e
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(UploadError::TransferFailed {
            attempts: self.max_attempts,
            last_error,
        })
    }
}
