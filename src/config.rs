//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ApiClientConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    crate::api::DEFAULT_API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

/// Shortest request timeout handed to the client
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Settings for [`ApiClient`](crate::api::ApiClient)
    ///
    /// A timeout below [`MIN_REQUEST_TIMEOUT_SECS`] is raised to it.
    pub fn client_config(&self) -> ApiClientConfig {
        if self.request_timeout_secs < MIN_REQUEST_TIMEOUT_SECS {
            tracing::warn!(
                configured = self.request_timeout_secs,
                used = MIN_REQUEST_TIMEOUT_SECS,
                "Request timeout too short, raising it"
            );
        }
        ApiClientConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(
                self.request_timeout_secs.max(MIN_REQUEST_TIMEOUT_SECS),
            ),
        }
    }
}

/// Persisted client storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("tenant-notes").join("storage.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./tenant_notes_storage.json".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl StorageConfig {
    /// Storage path with a leading `~/` expanded to the home directory
    pub fn resolved_path(&self) -> PathBuf {
        match (self.path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.path),
        }
    }
}

/// Accounts known to the built-in auth provider
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_allow_sign_up")]
    pub allow_sign_up: bool,

    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

fn default_allow_sign_up() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allow_sign_up: default_allow_sign_up(),
            accounts: Vec::new(),
        }
    }
}

/// A single pre-provisioned account
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub email: String,
    pub password: String,
    pub user_id: String,
    pub access_token: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("tenant-notes").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("TENANT_NOTES_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(timeout) = std::env::var("TENANT_NOTES_API_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.api.request_timeout_secs = secs;
            }
        }

        if let Ok(path) = std::env::var("TENANT_NOTES_STORAGE_PATH") {
            self.storage.path = path;
        }

        if let Ok(level) = std::env::var("TENANT_NOTES_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TENANT_NOTES_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Tenant Notes Configuration
#
# Environment variables override these settings:
# - TENANT_NOTES_API_URL
# - TENANT_NOTES_API_TIMEOUT
# - TENANT_NOTES_STORAGE_PATH
# - TENANT_NOTES_LOG_LEVEL
# - TENANT_NOTES_LOG_FORMAT

[api]
# Notes backend base URL
base_url = "http://localhost:8000"

# Client-side request timeout in seconds
request_timeout_secs = 10

[storage]
# File holding the access token and the last selected workspace
path = "~/.local/share/tenant-notes/storage.json"

[auth]
# Allow creating accounts from the signup screen
allow_sign_up = true

# Pre-provisioned accounts (token must be accepted by the backend)
# [[auth.accounts]]
# email = "me@example.com"
# password = "change-me"
# user_id = "00000000-0000-0000-0000-000000000000"
# access_token = "<jwt>"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
