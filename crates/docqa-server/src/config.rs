//! Configuration file parsing for the server.
//!
//! Loads bind address, storage locations, upload limits, JWT settings,
//! pipeline parameters and inference settings from TOML.

use docqa_llm::InferenceSettings;
use docqa_pipeline::PipelineConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A field is present but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 5000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory uploaded files are stored in
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Largest accepted upload, in bytes (default: 1 GiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// JWT secret for signing tokens
    #[serde(default)]
    pub jwt_secret: String,

    /// Token expiry in seconds (default: 3600 = 1 hour)
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,

    /// Chunking and context budget
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Inference endpoint settings
    #[serde(default)]
    pub inference: InferenceSettings,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    5000
}

fn default_database_path() -> PathBuf {
    PathBuf::from("document_qa.db")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> usize {
    1024 * 1024 * 1024
}

/// Default token expiry: 1 hour
fn default_token_expiry() -> u64 {
    3600
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and nested sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingField("jwt_secret".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        self.pipeline
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.inference.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            database_path: default_database_path(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            jwt_secret: "test-secret-key-do-not-use-in-production".to_string(),
            token_expiry_secs: default_token_expiry(),
            pipeline: PipelineConfig::default(),
            inference: InferenceSettings::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
        assert_eq!(config.token_expiry_secs, 3600);
        assert_eq!(config.max_upload_bytes, 1024 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            database_path = "/var/lib/docqa/docqa.db"
            upload_dir = "/var/lib/docqa/uploads"
            jwt_secret = "my-secret"
            token_expiry_secs = 7200

            [pipeline.chunking]
            chunk_size = 800
            overlap = 100

            [pipeline.budget]
            max_chunks = 5

            [inference]
            model = "mistral-small"
            timeout_secs = 10
        "#;

        let config = ServerConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/docqa/uploads"));
        assert_eq!(config.token_expiry_secs, 7200);
        assert_eq!(config.pipeline.chunking.chunk_size, 800);
        assert_eq!(config.pipeline.budget.max_chunks, 5);
        assert_eq!(config.pipeline.budget.max_chars, 3000);
        assert_eq!(config.inference.model, "mistral-small");
        assert_eq!(config.inference.max_tokens, 500);
    }

    #[test]
    fn test_missing_jwt_secret() {
        let result = ServerConfig::from_toml("bind_port = 8000\n");
        assert!(matches!(result, Err(ConfigError::MissingField(ref f)) if f == "jwt_secret"));
    }

    #[test]
    fn test_invalid_chunking_rejected() {
        let toml = r#"
            jwt_secret = "s"

            [pipeline.chunking]
            chunk_size = 100
            overlap = 100
        "#;
        assert!(matches!(
            ServerConfig::from_toml(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "jwt_secret = \"file-secret\"\n").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.jwt_secret, "file-secret");
        assert_eq!(config.database_path, PathBuf::from("document_qa.db"));
    }
}
