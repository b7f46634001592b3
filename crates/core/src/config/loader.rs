use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("NIMBUSCAST_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostingBackend;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[hosting]
backend = "direct"

[hosting.direct]
url = "https://api.example.com"
token_id = "id"
token_secret = "secret"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.hosting.backend, HostingBackend::Direct);
        assert_eq!(config.publisher.max_concurrent_uploads, 2);
    }

    #[test]
    fn test_load_config_from_str_missing_hosting() {
        let toml = r#"
[playback]
cors_origin = "https://app.example.com"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[hosting]
backend = "rpc"

[hosting.rpc]
url = "https://agent.example.com/tools/invoke"
api_key = "sk-test"

[publisher]
max_concurrent_uploads = 4
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.hosting.backend, HostingBackend::Rpc);
        assert_eq!(config.publisher.max_concurrent_uploads, 4);
    }
}
