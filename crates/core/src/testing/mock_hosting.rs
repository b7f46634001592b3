//! Mock hosting transport for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::hosting::{
    AssetRecord, AssetStatus, HostingApi, HostingError, NewUploadOptions, PlaybackPolicy,
    UploadSession,
};

/// A recorded upload session creation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCreateUpload {
    pub cors_origin: String,
    pub playback_policy: PlaybackPolicy,
    pub timestamp: DateTime<Utc>,
}

/// Mock implementation of the HostingApi trait.
///
/// Provides controllable behavior for testing:
/// - Track created upload sessions for assertions
/// - Script per-asset status sequences (the last step repeats)
/// - Count status queries per asset
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// let hosting = MockHostingApi::new();
/// hosting.script_asset("asset-1", vec![
///     Ok(MockHostingApi::processing("asset-1")),
///     Ok(MockHostingApi::ready("asset-1", "pb-1")),
/// ]).await;
///
/// let record = hosting.get_asset("asset-1").await?; // processing
/// let record = hosting.get_asset("asset-1").await?; // ready, repeats
/// assert_eq!(hosting.asset_query_count("asset-1").await, 2);
/// ```
pub struct MockHostingApi {
    /// Recorded create_upload calls.
    created: Arc<RwLock<Vec<RecordedCreateUpload>>>,
    /// If set, returned by the next create_upload instead of a generated one.
    next_session: Arc<RwLock<Option<UploadSession>>>,
    /// If set, the next create_upload fails with this error.
    next_create_error: Arc<RwLock<Option<HostingError>>>,
    /// Scripted resolve_asset_id answers by upload id.
    lookup_results: Arc<RwLock<HashMap<String, Option<String>>>>,
    /// If set, the next resolve_asset_id fails with this error.
    next_lookup_error: Arc<RwLock<Option<HostingError>>>,
    /// Scripted get_asset responses by asset id.
    asset_scripts: Arc<RwLock<HashMap<String, VecDeque<Result<AssetRecord, HostingError>>>>>,
    /// get_asset call counts by asset id.
    asset_queries: Arc<RwLock<HashMap<String, u32>>>,
    /// Counter for generating unique session ids.
    session_counter: Arc<RwLock<u32>>,
}

impl Default for MockHostingApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHostingApi {
    /// Create a new mock hosting transport.
    pub fn new() -> Self {
        Self {
            created: Arc::new(RwLock::new(Vec::new())),
            next_session: Arc::new(RwLock::new(None)),
            next_create_error: Arc::new(RwLock::new(None)),
            lookup_results: Arc::new(RwLock::new(HashMap::new())),
            next_lookup_error: Arc::new(RwLock::new(None)),
            asset_scripts: Arc::new(RwLock::new(HashMap::new())),
            asset_queries: Arc::new(RwLock::new(HashMap::new())),
            session_counter: Arc::new(RwLock::new(0)),
        }
    }

    /// An asset record in the `preparing` state.
    pub fn preparing(asset_id: &str) -> AssetRecord {
        AssetRecord {
            asset_id: asset_id.to_string(),
            status: AssetStatus::Preparing,
            playback_id: None,
            error_message: None,
        }
    }

    /// An asset record in the `processing` state.
    pub fn processing(asset_id: &str) -> AssetRecord {
        AssetRecord {
            asset_id: asset_id.to_string(),
            status: AssetStatus::Processing,
            playback_id: None,
            error_message: None,
        }
    }

    /// A terminal `ready` asset record with a playback id.
    pub fn ready(asset_id: &str, playback_id: &str) -> AssetRecord {
        AssetRecord {
            asset_id: asset_id.to_string(),
            status: AssetStatus::Ready,
            playback_id: Some(playback_id.to_string()),
            error_message: None,
        }
    }

    /// A terminal `errored` asset record.
    pub fn errored(asset_id: &str, message: &str) -> AssetRecord {
        AssetRecord {
            asset_id: asset_id.to_string(),
            status: AssetStatus::Errored,
            playback_id: None,
            error_message: Some(message.to_string()),
        }
    }

    /// Get all recorded create_upload calls.
    pub async fn created_uploads(&self) -> Vec<RecordedCreateUpload> {
        self.created.read().await.clone()
    }

    /// Use this session for the next create_upload call.
    pub async fn set_next_session(&self, session: UploadSession) {
        *self.next_session.write().await = Some(session);
    }

    /// Fail the next create_upload call with the given error.
    pub async fn fail_next_create(&self, error: HostingError) {
        *self.next_create_error.write().await = Some(error);
    }

    /// Script the answer for resolve_asset_id on the given upload id.
    pub async fn set_lookup(&self, upload_id: &str, asset_id: Option<String>) {
        self.lookup_results
            .write()
            .await
            .insert(upload_id.to_string(), asset_id);
    }

    /// Fail the next resolve_asset_id call with the given error.
    pub async fn fail_next_lookup(&self, error: HostingError) {
        *self.next_lookup_error.write().await = Some(error);
    }

    /// Script the status responses for an asset.
    ///
    /// Steps are returned in order; the final step repeats on every query
    /// after the script is exhausted.
    pub async fn script_asset(
        &self,
        asset_id: &str,
        steps: Vec<Result<AssetRecord, HostingError>>,
    ) {
        self.asset_scripts
            .write()
            .await
            .insert(asset_id.to_string(), steps.into());
    }

    /// How many times get_asset was called for the given asset.
    pub async fn asset_query_count(&self, asset_id: &str) -> u32 {
        self.asset_queries
            .read()
            .await
            .get(asset_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl HostingApi for MockHostingApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_upload(
        &self,
        options: &NewUploadOptions,
    ) -> Result<UploadSession, HostingError> {
        self.created.write().await.push(RecordedCreateUpload {
            cors_origin: options.cors_origin.clone(),
            playback_policy: options.playback_policy,
            timestamp: Utc::now(),
        });

        if let Some(error) = self.next_create_error.write().await.take() {
            return Err(error);
        }

        if let Some(session) = self.next_session.write().await.take() {
            return Ok(session);
        }

        let mut counter = self.session_counter.write().await;
        *counter += 1;
        Ok(UploadSession {
            upload_id: format!("upload-{}", counter),
            upload_url: format!("https://upload.mock.example/{}", counter),
            asset_id: Some(format!("asset-{}", counter)),
        })
    }

    async fn resolve_asset_id(&self, upload_id: &str) -> Result<Option<String>, HostingError> {
        if let Some(error) = self.next_lookup_error.write().await.take() {
            return Err(error);
        }

        Ok(self
            .lookup_results
            .read()
            .await
            .get(upload_id)
            .cloned()
            .unwrap_or(None))
    }

    async fn get_asset(&self, asset_id: &str) -> Result<AssetRecord, HostingError> {
        {
            let mut queries = self.asset_queries.write().await;
            *queries.entry(asset_id.to_string()).or_insert(0) += 1;
        }

        let mut scripts = self.asset_scripts.write().await;
        let Some(script) = scripts.get_mut(asset_id) else {
            return Err(HostingError::Api {
                status: 404,
                message: format!("unknown asset: {}", asset_id),
            });
        };

        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap_or(Err(HostingError::Api {
                status: 404,
                message: format!("unknown asset: {}", asset_id),
            }))
        }
    }
}
