//! Publishing pipeline orchestration.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{Config, ConfigError, PlaybackConfig};
use crate::hosting::{
    create_hosting_client, AssetRecord, ByteTransfer, HostingApi, HttpByteTransfer,
    NewUploadOptions,
};

use super::config::PublisherConfig;
use super::limiter::{AcquireTimeout, ConnectionLimiter};
use super::poller::{PollError, PollOptions, ReadinessPoller};
use super::upload::{UploadCoordinator, UploadError};

/// Result of a publish call.
///
/// The playback URL is provisional: it is built from the asset id before the
/// asset is ready and, for a fallback identifier, may never turn ready.
#[derive(Debug)]
pub struct PublishOutcome {
    pub asset_id: String,
    pub upload_id: String,
    /// True when the asset id is the upload id standing in for an asset the
    /// platform never linked.
    pub asset_id_is_fallback: bool,
    /// Provisional player reference for the asset.
    pub playback_url: String,
    /// Background readiness wait. Resolves to `None` when the poll failed;
    /// the failure is logged and never fails the publish itself.
    pub readiness: JoinHandle<Option<AssetRecord>>,
}

/// Errors surfaced to publish callers.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Every upload slot stayed busy for the whole acquisition timeout.
    #[error("Publishing is overloaded: {0}")]
    Overloaded(#[from] AcquireTimeout),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Orchestrates a publish: slot admission, upload, provisional playback
/// reference, background readiness watch.
pub struct PublishingPipeline {
    limiter: Arc<ConnectionLimiter>,
    uploader: UploadCoordinator,
    poller: Arc<ReadinessPoller>,
    playback: PlaybackConfig,
}

impl PublishingPipeline {
    /// Create a pipeline from explicit collaborators.
    pub fn new(
        config: &PublisherConfig,
        playback: PlaybackConfig,
        hosting: Arc<dyn HostingApi>,
        transfer: Arc<dyn ByteTransfer>,
    ) -> Self {
        let config = config.normalized();
        Self {
            limiter: Arc::new(ConnectionLimiter::new(
                config.max_concurrent_uploads,
                config.acquire_timeout(),
            )),
            uploader: UploadCoordinator::new(Arc::clone(&hosting), transfer, &config),
            poller: Arc::new(ReadinessPoller::new(hosting, &config)),
            playback,
        }
    }

    /// Create a pipeline wired from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let hosting = create_hosting_client(&config.hosting)?;
        let transfer: Arc<dyn ByteTransfer> = Arc::new(HttpByteTransfer::new(
            config.publisher.normalized().transfer_timeout(),
        ));
        Ok(Self::new(
            &config.publisher,
            config.playback.clone(),
            hosting,
            transfer,
        ))
    }

    /// Publish a local media file.
    ///
    /// The upload slot is held for the upload only; readiness polling
    /// continues in the background after this returns.
    pub async fn publish(&self, local_file: &Path) -> Result<PublishOutcome, PublishError> {
        self.limiter.acquire().await?;

        let options = NewUploadOptions::new(self.playback.cors_origin.clone())
            .with_playback_policy(self.playback.policy);

        let result = self.uploader.publish(local_file, &options).await;
        self.limiter.release();
        let uploaded = result?;

        let playback_url = self.player_url(&uploaded.asset_id);
        let readiness = self.spawn_readiness_watch(uploaded.asset_id.clone());

        info!(
            asset_id = %uploaded.asset_id,
            playback_url = %playback_url,
            "Publish complete, asset processing in background"
        );

        Ok(PublishOutcome {
            asset_id: uploaded.asset_id,
            upload_id: uploaded.upload_id,
            asset_id_is_fallback: uploaded.asset_id_is_fallback,
            playback_url,
            readiness,
        })
    }

    /// Wait for readiness of a previously published asset.
    ///
    /// Joins the pipeline's own background wait when one is in flight.
    pub async fn readiness(
        &self,
        asset_id: &str,
        options: PollOptions,
    ) -> Result<AssetRecord, PollError> {
        self.poller.wait_until_ready(asset_id, options).await
    }

    /// Current limiter occupancy as (admitted, queued).
    pub fn load(&self) -> (usize, usize) {
        (self.limiter.active(), self.limiter.queued())
    }

    fn player_url(&self, asset_id: &str) -> String {
        format!(
            "{}/{}",
            self.playback.player_base_url.trim_end_matches('/'),
            asset_id
        )
    }

    fn spawn_readiness_watch(&self, asset_id: String) -> JoinHandle<Option<AssetRecord>> {
        let poller = Arc::clone(&self.poller);
        tokio::spawn(async move {
            match poller.wait_until_ready(&asset_id, PollOptions::default()).await {
                Ok(record) => {
                    info!(asset_id = %asset_id, playback_id = ?record.playback_id, "Asset ready");
                    Some(record)
                }
                Err(e) => {
                    warn!(asset_id = %asset_id, "Readiness wait failed: {}", e);
                    None
                }
            }
        })
    }
}
