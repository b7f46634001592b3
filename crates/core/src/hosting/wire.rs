//! Wire shapes shared by the hosting transports.
//!
//! Platform responses are decoded into this closed set of shapes at the
//! transport boundary; anything else is a malformed response.

use serde::Deserialize;

use super::types::{AssetRecord, AssetStatus, HostingError, UploadSession};

/// Envelope wrapping every direct-API response payload.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    pub data: T,
}

/// Upload session payload.
#[derive(Debug, Deserialize)]
pub(super) struct WireUpload {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub asset_id: Option<String>,
}

impl WireUpload {
    /// Convert a session-creation payload into a usable session.
    ///
    /// A creation response without an upload URL is unusable and fatal.
    pub fn into_session(self) -> Result<UploadSession, HostingError> {
        let upload_url = self
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                HostingError::MalformedResponse(
                    "upload session response has no upload URL".to_string(),
                )
            })?;

        Ok(UploadSession {
            upload_id: self.id,
            upload_url,
            asset_id: self.asset_id.filter(|a| !a.is_empty()),
        })
    }

    /// Extract the linked asset id from a follow-up lookup payload.
    pub fn into_asset_id(self) -> Option<String> {
        self.asset_id.filter(|a| !a.is_empty())
    }
}

/// Asset payload.
#[derive(Debug, Deserialize)]
pub(super) struct WireAsset {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub playback_ids: Option<Vec<WirePlaybackId>>,
    #[serde(default)]
    pub errors: Option<WireAssetErrors>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WirePlaybackId {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireAssetErrors {
    #[serde(default)]
    pub messages: Option<Vec<String>>,
}

impl WireAsset {
    pub fn into_record(self) -> Result<AssetRecord, HostingError> {
        let status = parse_asset_status(&self.status)?;

        Ok(AssetRecord {
            asset_id: self.id,
            status,
            playback_id: self
                .playback_ids
                .and_then(|ids| ids.into_iter().next())
                .map(|p| p.id),
            error_message: self
                .errors
                .and_then(|e| e.messages)
                .and_then(|m| m.into_iter().next()),
        })
    }
}

/// Parse a platform status string into an AssetStatus.
///
/// Unknown statuses are rejected rather than guessed at.
pub(super) fn parse_asset_status(status: &str) -> Result<AssetStatus, HostingError> {
    match status {
        "preparing" => Ok(AssetStatus::Preparing),
        "processing" => Ok(AssetStatus::Processing),
        "ready" => Ok(AssetStatus::Ready),
        "errored" => Ok(AssetStatus::Errored),
        other => Err(HostingError::MalformedResponse(format!(
            "unknown asset status: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_asset_status_known() {
        assert_eq!(
            parse_asset_status("preparing").unwrap(),
            AssetStatus::Preparing
        );
        assert_eq!(
            parse_asset_status("processing").unwrap(),
            AssetStatus::Processing
        );
        assert_eq!(parse_asset_status("ready").unwrap(), AssetStatus::Ready);
        assert_eq!(parse_asset_status("errored").unwrap(), AssetStatus::Errored);
    }

    #[test]
    fn test_parse_asset_status_unknown_is_malformed() {
        let err = parse_asset_status("transcoding").unwrap_err();
        assert!(matches!(err, HostingError::MalformedResponse(_)));
    }

    #[test]
    fn test_wire_upload_into_session() {
        let wire: WireUpload = serde_json::from_str(
            r#"{"id": "up-1", "url": "https://upload.example.com/signed", "asset_id": "asset-1"}"#,
        )
        .unwrap();

        let session = wire.into_session().unwrap();
        assert_eq!(session.upload_id, "up-1");
        assert_eq!(session.upload_url, "https://upload.example.com/signed");
        assert_eq!(session.asset_id, Some("asset-1".to_string()));
    }

    #[test]
    fn test_wire_upload_without_asset_id() {
        let wire: WireUpload =
            serde_json::from_str(r#"{"id": "up-2", "url": "https://upload.example.com/signed"}"#)
                .unwrap();

        let session = wire.into_session().unwrap();
        assert_eq!(session.asset_id, None);
    }

    #[test]
    fn test_wire_upload_missing_url_is_malformed() {
        let wire: WireUpload = serde_json::from_str(r#"{"id": "up-3"}"#).unwrap();
        let err = wire.into_session().unwrap_err();
        assert!(matches!(err, HostingError::MalformedResponse(_)));
    }

    #[test]
    fn test_wire_upload_empty_url_is_malformed() {
        let wire: WireUpload = serde_json::from_str(r#"{"id": "up-4", "url": ""}"#).unwrap();
        assert!(wire.into_session().is_err());
    }

    #[test]
    fn test_wire_upload_into_asset_id() {
        let wire: WireUpload =
            serde_json::from_str(r#"{"id": "up-5", "asset_id": "asset-9"}"#).unwrap();
        assert_eq!(wire.into_asset_id(), Some("asset-9".to_string()));

        let unlinked: WireUpload = serde_json::from_str(r#"{"id": "up-6"}"#).unwrap();
        assert_eq!(unlinked.into_asset_id(), None);
    }

    #[test]
    fn test_wire_asset_into_record() {
        let wire: WireAsset = serde_json::from_str(
            r#"{"id": "asset-1", "status": "ready", "playback_ids": [{"id": "pb-1"}, {"id": "pb-2"}]}"#,
        )
        .unwrap();

        let record = wire.into_record().unwrap();
        assert_eq!(record.asset_id, "asset-1");
        assert_eq!(record.status, AssetStatus::Ready);
        assert_eq!(record.playback_id, Some("pb-1".to_string()));
        assert_eq!(record.error_message, None);
    }

    #[test]
    fn test_wire_asset_errored_carries_message() {
        let wire: WireAsset = serde_json::from_str(
            r#"{"id": "asset-2", "status": "errored", "errors": {"messages": ["input file unreadable"]}}"#,
        )
        .unwrap();

        let record = wire.into_record().unwrap();
        assert_eq!(record.status, AssetStatus::Errored);
        assert_eq!(
            record.error_message,
            Some("input file unreadable".to_string())
        );
    }

    #[test]
    fn test_envelope_decoding() {
        let envelope: Envelope<WireAsset> = serde_json::from_str(
            r#"{"data": {"id": "asset-3", "status": "processing"}}"#,
        )
        .unwrap();
        assert_eq!(envelope.data.id, "asset-3");
    }
}
