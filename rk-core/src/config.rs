//! Application configuration management.
//!
//! Handles loading, saving, and accessing the client configuration: target
//! base URI, auth token, client identity, and logging preferences.
//! Configuration is persisted as TOML on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{RkError, RkResult};
use crate::platform::Platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST client settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// REST client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name the HTTP client is registered under; also the User-Agent product.
    #[serde(default = "default_client_name")]
    pub name: String,

    /// Version reported in the User-Agent.
    #[serde(default = "default_client_version")]
    pub version: String,

    /// Absolute base URI all call paths are resolved against.
    #[serde(default)]
    pub base_uri: String,

    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Omit the Authorization header when the token is absent or empty.
    #[serde(default)]
    pub omit_empty_token: bool,

    /// Extra default headers as key-value pairs.
    #[serde(default)]
    pub default_headers: HashMap<String, String>,

    /// Whether to accept invalid TLS certificates from the server.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

// Default value functions for serde

fn default_client_name() -> String {
    constants::DEFAULT_CLIENT_NAME.to_string()
}

fn default_client_version() -> String {
    constants::APP_VERSION.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: default_client_name(),
            version: default_client_version(),
            base_uri: String::new(),
            auth_token: None,
            omit_empty_token: false,
            default_headers: HashMap::new(),
            accept_invalid_certs: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> RkResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> RkResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default config file path.
    pub fn save_default(&self) -> RkResult<()> {
        let path = Self::default_config_path()?;
        self.save_to_file(&path)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> RkResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RkError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> RkResult<PathBuf> {
        let config_dir = Platform::config_dir()?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> RkResult<PathBuf> {
        if self.logging.directory.is_empty() {
            let data_dir = Platform::data_dir()?;
            Ok(data_dir.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Check whether a base URI has been configured.
    pub fn is_client_configured(&self) -> bool {
        !self.client.base_uri.trim().is_empty()
    }

    /// Sanitize and normalize a base URI typed by a user.
    ///
    /// Strips surrounding whitespace and quotes and adds `http://` when no
    /// scheme is present. Trailing slashes are kept: they mark the base path
    /// as a directory for relative call paths.
    pub fn sanitize_base_uri(uri: &str) -> String {
        let trimmed = uri.trim().trim_matches('"').trim();
        if trimmed.is_empty() {
            return String::new();
        }

        if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        }
    }
}
