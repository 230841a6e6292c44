//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::ClientError;

/// Client configuration, usually read from a TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// RPC endpoint URL
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Config for `rpc_url` with default settings otherwise
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }

    /// Parse from TOML text; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ClientError> {
        let config: Self = toml::from_str(content).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn validate(&self) -> Result<(), ClientError> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "rpc_url must be an http(s) URL, got `{}`",
                self.rpc_url
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(ClientError::Config("request_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.rpc_url, "http://localhost:8545");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_partial_toml() {
        let config = ClientConfig::from_toml_str("rpc_url = \"https://rpc.example.org\"").unwrap();
        assert_eq!(config.rpc_url, "https://rpc.example.org");
        assert_eq!(config.request_timeout_ms, 30_000);

        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_toml_str("rpc_url = \"ws://node\""),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_toml_str("request_timeout_ms = 0"),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_toml_str("request_timeout_ms = \"soon\""),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_config_serialize_roundtrip() {
        let config = ClientConfig::new("http://10.0.0.2:8545");
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("rpc_url"));
        assert_eq!(ClientConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = ClientConfig::load("/nonexistent/fugue.toml").unwrap_err();
        assert!(matches!(err, ClientError::Config(msg) if msg.contains("/nonexistent/fugue.toml")));
    }
}
