//! Types for hosting platform operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the hosting platform.
#[derive(Debug, Clone, Error)]
pub enum HostingError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl HostingError {
    /// Map a reqwest transport failure onto the hosting error surface.
    pub(crate) fn from_request(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HostingError::Timeout
        } else {
            HostingError::ConnectionFailed(e.to_string())
        }
    }
}

/// Processing state of an asset on the hosting platform.
///
/// Advances monotonically; `Ready` and `Errored` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// Bytes received, asset not yet queued for processing.
    Preparing,
    /// Platform is transcoding the asset.
    Processing,
    /// Asset is streamable.
    Ready,
    /// Platform failed to process the asset.
    Errored,
}

impl AssetStatus {
    /// Returns the string representation for API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Preparing => "preparing",
            AssetStatus::Processing => "processing",
            AssetStatus::Ready => "ready",
            AssetStatus::Errored => "errored",
        }
    }

    /// Whether the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssetStatus::Ready | AssetStatus::Errored)
    }
}

/// One attempt to move a local file to the hosting platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSession {
    /// Platform-assigned session identifier.
    pub upload_id: String,
    /// One-time signed endpoint for the byte transfer.
    pub upload_url: String,
    /// Asset identifier, when the platform assigns one up front.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
}

/// The hosting platform's view of a published artifact.
///
/// Owned entirely by the platform; observed via status queries only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Stable asset identifier.
    pub asset_id: String,
    /// Current processing status.
    pub status: AssetStatus,
    /// Playback identifier, present once the asset is ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_id: Option<String>,
    /// Platform-reported failure detail for errored assets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Playback policy requested for new assets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPolicy {
    #[default]
    Public,
    Signed,
}

impl PlaybackPolicy {
    /// Returns the string representation for API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackPolicy::Public => "public",
            PlaybackPolicy::Signed => "signed",
        }
    }
}

/// Options for creating a new upload session.
#[derive(Debug, Clone)]
pub struct NewUploadOptions {
    /// Origin allowed to drive the direct upload.
    pub cors_origin: String,
    /// Playback policy for the resulting asset.
    pub playback_policy: PlaybackPolicy,
}

impl NewUploadOptions {
    /// Create options with the default (public) playback policy.
    pub fn new(cors_origin: impl Into<String>) -> Self {
        Self {
            cors_origin: cors_origin.into(),
            playback_policy: PlaybackPolicy::default(),
        }
    }

    /// Set the playback policy.
    pub fn with_playback_policy(mut self, policy: PlaybackPolicy) -> Self {
        self.playback_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_status_as_str() {
        assert_eq!(AssetStatus::Preparing.as_str(), "preparing");
        assert_eq!(AssetStatus::Processing.as_str(), "processing");
        assert_eq!(AssetStatus::Ready.as_str(), "ready");
        assert_eq!(AssetStatus::Errored.as_str(), "errored");
    }

    #[test]
    fn test_asset_status_terminal() {
        assert!(!AssetStatus::Preparing.is_terminal());
        assert!(!AssetStatus::Processing.is_terminal());
        assert!(AssetStatus::Ready.is_terminal());
        assert!(AssetStatus::Errored.is_terminal());
    }

    #[test]
    fn test_asset_status_serialization() {
        assert_eq!(
            serde_json::to_string(&AssetStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::from_str::<AssetStatus>("\"ready\"").unwrap(),
            AssetStatus::Ready
        );
    }

    #[test]
    fn test_new_upload_options_builder() {
        let options = NewUploadOptions::new("https://app.example.com")
            .with_playback_policy(PlaybackPolicy::Signed);
        assert_eq!(options.cors_origin, "https://app.example.com");
        assert_eq!(options.playback_policy, PlaybackPolicy::Signed);
    }

    #[test]
    fn test_asset_record_serialization() {
        let record = AssetRecord {
            asset_id: "asset-1".to_string(),
            status: AssetStatus::Ready,
            playback_id: Some("pb-1".to_string()),
            error_message: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: AssetRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.asset_id, "asset-1");
        assert_eq!(parsed.status, AssetStatus::Ready);
        assert_eq!(parsed.playback_id, Some("pb-1".to_string()));
        assert!(!json.contains("error_message"));
    }
}
