//! RPC tool-call hosting transport.
//!
//! Reaches the platform through a single tool-invocation endpoint instead of
//! its HTTPS API: every operation is one POST carrying a `{tool, arguments}`
//! envelope with a bearer credential.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::RpcApiConfig;

use super::types::{AssetRecord, HostingError, NewUploadOptions, UploadSession};
use super::wire::{WireAsset, WireUpload};
use super::HostingApi;

pub struct RpcHostingClient {
    client: Client,
    config: RpcApiConfig,
}

#[derive(Debug, Serialize)]
struct ToolCallRequest<'a, T: Serialize> {
    request_id: String,
    tool: &'a str,
    arguments: T,
}

#[derive(Debug, Deserialize)]
struct ToolCallResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<ToolCallErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ToolCallErrorDetail {
    message: String,
    #[serde(default)]
    status: Option<u16>,
}

#[derive(Debug, Serialize)]
struct CreateUploadArgs<'a> {
    cors_origin: &'a str,
    playback_policy: &'a str,
}

#[derive(Debug, Serialize)]
struct UploadIdArgs<'a> {
    upload_id: &'a str,
}

#[derive(Debug, Serialize)]
struct AssetIdArgs<'a> {
    asset_id: &'a str,
}

impl RpcHostingClient {
    /// Create a new RPC client.
    pub fn new(config: RpcApiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Invoke a tool and return its result payload.
    async fn invoke<T: Serialize>(
        &self,
        tool: &str,
        arguments: T,
    ) -> Result<serde_json::Value, HostingError> {
        let request = ToolCallRequest {
            request_id: Uuid::new_v4().to_string(),
            tool,
            arguments,
        };

        debug!(tool, request_id = %request.request_id, "Invoking hosting tool");

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(HostingError::from_request)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(HostingError::AuthenticationFailed(
                "Invalid API key".to_string(),
            ));
        }

        if !status.is_success() {
            return Err(HostingError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect::<String>(),
            });
        }

        let envelope: ToolCallResponse = serde_json::from_str(&body)
            .map_err(|e| HostingError::MalformedResponse(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(HostingError::Api {
                status: error.status.unwrap_or(500),
                message: error.message,
            });
        }

        envelope.result.ok_or_else(|| {
            HostingError::MalformedResponse("tool response has neither result nor error".to_string())
        })
    }
}

#[async_trait]
impl HostingApi for RpcHostingClient {
    fn name(&self) -> &str {
        "rpc"
    }

    async fn create_upload(
        &self,
        options: &NewUploadOptions,
    ) -> Result<UploadSession, HostingError> {
        let result = self
            .invoke(
                "create_upload",
                CreateUploadArgs {
                    cors_origin: &options.cors_origin,
                    playback_policy: options.playback_policy.as_str(),
                },
            )
            .await?;

        let wire: WireUpload = serde_json::from_value(result)
            .map_err(|e| HostingError::MalformedResponse(e.to_string()))?;
        wire.into_session()
    }

    async fn resolve_asset_id(&self, upload_id: &str) -> Result<Option<String>, HostingError> {
        let result = self
            .invoke("get_upload", UploadIdArgs { upload_id })
            .await?;

        let wire: WireUpload = serde_json::from_value(result)
            .map_err(|e| HostingError::MalformedResponse(e.to_string()))?;
        Ok(wire.into_asset_id())
    }

    async fn get_asset(&self, asset_id: &str) -> Result<AssetRecord, HostingError> {
        let result = self.invoke("get_asset", AssetIdArgs { asset_id }).await?;

        let wire: WireAsset = serde_json::from_value(result)
            .map_err(|e| HostingError::MalformedResponse(e.to_string()))?;
        wire.into_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_request_shape() {
        let request = ToolCallRequest {
            request_id: "req-1".to_string(),
            tool: "create_upload",
            arguments: CreateUploadArgs {
                cors_origin: "*",
                playback_policy: "public",
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tool"], "create_upload");
        assert_eq!(json["arguments"]["cors_origin"], "*");
        assert_eq!(json["arguments"]["playback_policy"], "public");
    }

    #[test]
    fn test_tool_call_response_with_result() {
        let envelope: ToolCallResponse =
            serde_json::from_str(r#"{"result": {"id": "up-1", "url": "https://u.example"}}"#)
                .unwrap();
        assert!(envelope.result.is_some());
        assert!(envelope.error.is_none());
    }

    #[test]
    fn test_tool_call_response_with_error() {
        let envelope: ToolCallResponse =
            serde_json::from_str(r#"{"error": {"message": "upload quota exceeded", "status": 429}}"#)
                .unwrap();
        let error = envelope.error.unwrap();
        assert_eq!(error.status, Some(429));
        assert_eq!(error.message, "upload quota exceeded");
    }

    #[test]
    fn test_client_name() {
        let client = RpcHostingClient::new(RpcApiConfig {
            url: "https://agent.example.com/tools/invoke".to_string(),
            api_key: "sk-test".to_string(),
            timeout_secs: 30,
        });
        assert_eq!(client.name(), "rpc");
    }
}
