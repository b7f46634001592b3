use serde::{Deserialize, Serialize};

use crate::hosting::PlaybackPolicy;
use crate::publisher::PublisherConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub hosting: HostingConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// Hosting platform configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostingConfig {
    /// Transport used to reach the hosting platform
    pub backend: HostingBackend,
    /// Direct HTTPS transport configuration (required when backend = "direct")
    #[serde(default)]
    pub direct: Option<DirectApiConfig>,
    /// RPC tool-call transport configuration (required when backend = "rpc")
    #[serde(default)]
    pub rpc: Option<RpcApiConfig>,
}

/// Available hosting transports
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HostingBackend {
    Direct,
    Rpc,
}

/// Direct HTTPS transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectApiConfig {
    /// Platform API base URL (e.g., "https://api.example.com")
    pub url: String,
    /// API token id (basic auth username)
    pub token_id: String,
    /// API token secret (basic auth password)
    pub token_secret: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// RPC tool-call transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcApiConfig {
    /// Tool endpoint URL (e.g., "https://agent.example.com/tools/invoke")
    pub url: String,
    /// Bearer API key
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Playback reference configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Base URL for player references (the asset id is appended)
    #[serde(default = "default_player_base_url")]
    pub player_base_url: String,
    /// CORS origin sent when creating upload sessions
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Playback policy requested for new assets
    #[serde(default)]
    pub policy: PlaybackPolicy,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            player_base_url: default_player_base_url(),
            cors_origin: default_cors_origin(),
            policy: PlaybackPolicy::default(),
        }
    }
}

fn default_player_base_url() -> String {
    "https://play.nimbuscast.example".to_string()
}

fn default_cors_origin() -> String {
    "*".to_string()
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub hosting: SanitizedHostingConfig,
    pub publisher: PublisherConfig,
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedHostingConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct: Option<SanitizedDirectApiConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc: Option<SanitizedRpcApiConfig>,
}

/// Sanitized direct transport config (token secret hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDirectApiConfig {
    pub url: String,
    pub token_id: String,
    pub token_secret_configured: bool,
    pub timeout_secs: u32,
}

/// Sanitized RPC transport config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRpcApiConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            hosting: SanitizedHostingConfig {
                backend: match config.hosting.backend {
                    HostingBackend::Direct => "direct".to_string(),
                    HostingBackend::Rpc => "rpc".to_string(),
                },
                direct: config
                    .hosting
                    .direct
                    .as_ref()
                    .map(|d| SanitizedDirectApiConfig {
                        url: d.url.clone(),
                        token_id: d.token_id.clone(),
                        token_secret_configured: !d.token_secret.is_empty(),
                        timeout_secs: d.timeout_secs,
                    }),
                rpc: config.hosting.rpc.as_ref().map(|r| SanitizedRpcApiConfig {
                    url: r.url.clone(),
                    api_key_configured: !r.api_key.is_empty(),
                    timeout_secs: r.timeout_secs,
                }),
            },
            publisher: config.publisher.clone(),
            playback: config.playback.clone(),
        }
    }
}
