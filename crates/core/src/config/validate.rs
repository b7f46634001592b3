use super::{
    types::{Config, HostingBackend},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Hosting backend has its matching transport section with credentials
/// - Playback player base URL is set
/// - Publisher concurrency is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    match config.hosting.backend {
        HostingBackend::Direct => {
            let direct = config.hosting.direct.as_ref().ok_or_else(|| {
                ConfigError::ValidationError(
                    "[hosting.direct] must be set when backend = \"direct\"".to_string(),
                )
            })?;
            if direct.url.is_empty() {
                return Err(ConfigError::ValidationError(
                    "hosting.direct.url cannot be empty".to_string(),
                ));
            }
            if direct.token_id.is_empty() || direct.token_secret.is_empty() {
                return Err(ConfigError::ValidationError(
                    "hosting.direct token_id and token_secret must be set".to_string(),
                ));
            }
        }
        HostingBackend::Rpc => {
            let rpc = config.hosting.rpc.as_ref().ok_or_else(|| {
                ConfigError::ValidationError(
                    "[hosting.rpc] must be set when backend = \"rpc\"".to_string(),
                )
            })?;
            if rpc.url.is_empty() {
                return Err(ConfigError::ValidationError(
                    "hosting.rpc.url cannot be empty".to_string(),
                ));
            }
            if rpc.api_key.is_empty() {
                return Err(ConfigError::ValidationError(
                    "hosting.rpc.api_key cannot be empty".to_string(),
                ));
            }
        }
    }

    if config.playback.player_base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "playback.player_base_url cannot be empty".to_string(),
        ));
    }

    if config.publisher.max_concurrent_uploads == 0 {
        return Err(ConfigError::ValidationError(
            "publisher.max_concurrent_uploads cannot be 0".to_string(),
        ));
    }

    Ok(())
}
