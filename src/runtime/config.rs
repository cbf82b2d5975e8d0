//! Server configuration and the optional `config.json` file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default name of the optional JSON config file.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Configuration for the lambdo server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LambdoConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Path of the JSON file returned by `LambdoServer::config`.
    /// Relative paths resolve against the working directory.
    pub config_file: PathBuf,
}

impl Default for LambdoConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_size: 10 * 1024 * 1024, // 10MB
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }
}

impl LambdoConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the maximum request body size.
    pub fn max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Set the config file path.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = path.into();
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Failure reading the JSON config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a JSON config file.
///
/// A missing file yields an empty JSON object. No schema is applied.
pub fn load_config_file(path: &Path) -> Result<serde_json::Value, ConfigError> {
    if !path.exists() {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }

    let data = std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_builder() {
        let config = LambdoConfig::new()
            .host("127.0.0.1")
            .port(9000)
            .max_body_size(1024)
            .config_file("/etc/lambdo.json");

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.max_body_size, 1024);
        assert_eq!(config.config_file, PathBuf::from("/etc/lambdo.json"));
    }

    #[test]
    fn test_default_config_file() {
        assert_eq!(
            LambdoConfig::default().config_file,
            PathBuf::from(DEFAULT_CONFIG_FILE)
        );
    }

    #[test]
    fn test_missing_file_is_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let value = load_config_file(&dir.path().join("config.json")).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn test_present_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"apiKey": "secret", "limits": [1, 2]}"#)
            .unwrap();

        let value = load_config_file(&path).unwrap();
        assert_eq!(value["apiKey"], "secret");
        assert_eq!(value["limits"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_config_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
