//! Direct HTTPS hosting transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::DirectApiConfig;

use super::types::{AssetRecord, HostingError, NewUploadOptions, UploadSession};
use super::wire::{Envelope, WireAsset, WireUpload};
use super::HostingApi;

/// Hosting client that talks to the platform's HTTPS API with a basic-auth
/// token pair.
pub struct DirectHostingClient {
    client: Client,
    config: DirectApiConfig,
}

impl DirectHostingClient {
    /// Create a new direct client.
    pub fn new(config: DirectApiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Make an authenticated GET request.
    async fn get(&self, endpoint: &str) -> Result<String, HostingError> {
        let url = format!("{}{}", self.base_url(), endpoint);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.token_id, Some(&self.config.token_secret))
            .send()
            .await
            .map_err(HostingError::from_request)?;

        Self::read_body(response).await
    }

    /// Make an authenticated POST request with a JSON body.
    async fn post_json<T: Serialize>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<String, HostingError> {
        let url = format!("{}{}", self.base_url(), endpoint);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.token_id, Some(&self.config.token_secret))
            .json(body)
            .send()
            .await
            .map_err(HostingError::from_request)?;

        Self::read_body(response).await
    }

    async fn read_body(response: reqwest::Response) -> Result<String, HostingError> {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(HostingError::AuthenticationFailed(
                "Invalid token credentials".to_string(),
            ));
        }

        if !status.is_success() {
            return Err(HostingError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect::<String>(),
            });
        }

        Ok(body)
    }
}

/// Request body for upload session creation.
#[derive(Debug, Serialize)]
struct CreateUploadBody<'a> {
    cors_origin: &'a str,
    new_asset_settings: NewAssetSettings<'a>,
}

#[derive(Debug, Serialize)]
struct NewAssetSettings<'a> {
    playback_policy: [&'a str; 1],
}

#[async_trait]
impl HostingApi for DirectHostingClient {
    fn name(&self) -> &str {
        "direct"
    }

    async fn create_upload(
        &self,
        options: &NewUploadOptions,
    ) -> Result<UploadSession, HostingError> {
        let body = CreateUploadBody {
            cors_origin: &options.cors_origin,
            new_asset_settings: NewAssetSettings {
                playback_policy: [options.playback_policy.as_str()],
            },
        };

        let response = self.post_json("/video/v1/uploads", &body).await?;
        let envelope: Envelope<WireUpload> = serde_json::from_str(&response)
            .map_err(|e| HostingError::MalformedResponse(e.to_string()))?;

        let session = envelope.data.into_session()?;
        debug!(upload_id = %session.upload_id, "Created upload session");
        Ok(session)
    }

    async fn resolve_asset_id(&self, upload_id: &str) -> Result<Option<String>, HostingError> {
        let response = self.get(&format!("/video/v1/uploads/{}", upload_id)).await?;
        let envelope: Envelope<WireUpload> = serde_json::from_str(&response)
            .map_err(|e| HostingError::MalformedResponse(e.to_string()))?;

        Ok(envelope.data.into_asset_id())
    }

    async fn get_asset(&self, asset_id: &str) -> Result<AssetRecord, HostingError> {
        let response = self.get(&format!("/video/v1/assets/{}", asset_id)).await?;
        let envelope: Envelope<WireAsset> = serde_json::from_str(&response)
            .map_err(|e| HostingError::MalformedResponse(e.to_string()))?;

        envelope.data.into_record()
    }
}
