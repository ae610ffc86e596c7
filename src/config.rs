//! Configuration module for studyshare.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, ShareError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins. Empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Identity service configuration for bearer-token verification.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// URL of the identity service's JWKS document.
    #[serde(default = "default_jwks_url")]
    pub jwks_url: String,
    /// Expected token issuer.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Expected token audience.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// How long fetched signing keys stay cached, in seconds.
    #[serde(default = "default_keys_ttl")]
    pub keys_ttl_secs: u64,
}

fn default_jwks_url() -> String {
    "https://identity.example.com/.well-known/jwks.json".to_string()
}

fn default_issuer() -> String {
    "https://identity.example.com".to_string()
}

fn default_audience() -> String {
    "studyshare".to_string()
}

fn default_keys_ttl() -> u64 {
    3600
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            jwks_url: default_jwks_url(),
            issuer: default_issuer(),
            audience: default_audience(),
            keys_ttl_secs: default_keys_ttl(),
        }
    }
}

/// Object store (drive API) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    /// Base URL for metadata calls (folder lookup/create, permissions).
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Base URL for media upload calls.
    #[serde(default = "default_upload_base")]
    pub upload_base: String,
    /// Bearer credential presented to the drive API.
    #[serde(default)]
    pub api_token: String,
    /// Folder id the four-level tree hangs under.
    #[serde(default = "default_root_folder")]
    pub root_folder: String,
}

fn default_api_base() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_upload_base() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn default_root_folder() -> String {
    "root".to_string()
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            upload_base: default_upload_base(),
            api_token: String::new(),
            root_folder: default_root_folder(),
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// MongoDB connection URI.
    #[serde(default = "default_db_uri")]
    pub uri: String,
    /// Database name.
    #[serde(default = "default_db_name")]
    pub database: String,
    /// Collection holding resource records.
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_db_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_db_name() -> String {
    "studyshare".to_string()
}

fn default_collection() -> String {
    "resources".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: default_db_uri(),
            database: default_db_name(),
            collection: default_collection(),
        }
    }
}

/// Upload limits.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_size_mb: u64,
}

fn default_max_upload_size() -> u64 {
    25
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_mb: default_max_upload_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file path. Console-only when absent.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Identity service settings.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Object store settings.
    #[serde(default)]
    pub drive: DriveConfig,
    /// Document store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Upload limits.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ShareError::Config(e.to_string()))
    }

    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.upload.max_size_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.collection, "resources");
        assert_eq!(config.drive.root_folder, "root");
        assert_eq!(config.upload.max_size_mb, 25);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_empty() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.identity.audience, "studyshare");
    }

    #[test]
    fn test_parse_partial() {
        let config = Config::parse(
            r#"
            [server]
            port = 9000

            [database]
            uri = "mongodb://db.internal:27017"
            database = "notes"

            [drive]
            api_token = "secret"
            root_folder = "folder-abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.uri, "mongodb://db.internal:27017");
        assert_eq!(config.database.database, "notes");
        assert_eq!(config.database.collection, "resources");
        assert_eq!(config.drive.api_token, "secret");
        assert_eq!(config.drive.root_folder, "folder-abc");
    }

    #[test]
    fn test_parse_invalid() {
        let result = Config::parse("[server]\nport = \"not a number\"");
        assert!(matches!(result, Err(ShareError::Config(_))));
    }

    #[test]
    fn test_max_upload_bytes() {
        let mut config = Config::default();
        config.upload.max_size_mb = 2;
        assert_eq!(config.max_upload_bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("does/not/exist.toml");
        assert!(matches!(result, Err(ShareError::Io(_))));
    }
}
