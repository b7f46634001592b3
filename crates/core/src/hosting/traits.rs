//! Trait seams for the hosting platform collaborators.

use async_trait::async_trait;
use bytes::Bytes;

use super::types::{AssetRecord, HostingError, NewUploadOptions, UploadSession};

/// Trait for hosting platform transports.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Transport name for logging.
    fn name(&self) -> &str;

    /// Create a new upload session.
    async fn create_upload(
        &self,
        options: &NewUploadOptions,
    ) -> Result<UploadSession, HostingError>;

    /// Look up the asset id assigned to an upload session.
    ///
    /// Returns `Ok(None)` when the platform has not linked an asset yet.
    async fn resolve_asset_id(&self, upload_id: &str) -> Result<Option<String>, HostingError>;

    /// Query the current state of an asset.
    async fn get_asset(&self, asset_id: &str) -> Result<AssetRecord, HostingError>;
}

/// Trait for the byte-transfer target.
///
/// Implementations send a single PUT-style request with an explicit
/// `Content-Length` and report 2xx responses as success.
#[async_trait]
pub trait ByteTransfer: Send + Sync {
    /// Transfer `body` to the signed upload URL.
    async fn put(&self, url: &str, body: Bytes) -> Result<(), HostingError>;
}
