//! # Configuration Management
//!
//! Runtime settings for the publisher service, loaded from JSON:
//!
//! - [`ServerConfig`]: bind address defaults
//! - [`StaticFilesConfig`]: where the web client's files live
//! - [`LimitsConfig`]: request and upload size limits
//! - [`UpstreamSettings`]: outbound HTTP client settings
//!
//! ```rust,no_run
//! # use nexus_publisher::config::Config;
//! // Load from file with fallback to defaults
//! let config = Config::load_or_default("nexus-publisher.json")?;
//!
//! // Use built-in defaults
//! let config = Config::default();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{AppError, AppResult};
use crate::upstream::UpstreamConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for the publisher service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration (host, port)
    pub server: ServerConfig,
    /// Static web client settings
    #[serde(default)]
    pub static_files: StaticFilesConfig,
    /// Upload and request limits (defaults applied if not specified)
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Outbound HTTP client settings
    #[serde(default)]
    pub upstream: UpstreamSettings,
}

/// Server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Default host/IP address to bind to (e.g., "0.0.0.0" or "localhost")
    pub default_host: String,
    /// Default port number to listen on
    pub default_port: u16,
}

/// Location of the single-page web client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticFilesConfig {
    /// Directory served for every non-API path
    pub dir: PathBuf,
    /// Entry document returned for client-side routes
    pub index: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public"),
            index: "index.html".to_string(),
        }
    }
}

impl StaticFilesConfig {
    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&self.index)
    }
}

/// Upload and request limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_upload_size_mb: usize,
    pub max_request_body_size_mb: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_upload_size_mb: 256,
            max_request_body_size_mb: 260,
        }
    }
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    pub user_agent: String,
    /// Absent means the HTTP client's own default (no overall timeout)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        let defaults = UpstreamConfig::default();
        Self {
            user_agent: defaults.user_agent,
            timeout_secs: None,
        }
    }
}

impl UpstreamSettings {
    pub fn to_upstream_config(&self) -> UpstreamConfig {
        UpstreamConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The file cannot be read (file not found, permissions, etc.)
    /// - The file contains invalid JSON
    /// - The JSON structure doesn't match the expected configuration format
    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)?;
        serde_json::from_str(&config_str).map_err(|e| {
            AppError::InternalError(format!("Invalid configuration in {}: {e}", path.display()))
        })
    }

    /// Load configuration from file with fallback to defaults.
    ///
    /// A missing file yields [`Config::default`]; a file that exists but
    /// cannot be parsed is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.limits.max_upload_size_mb as u64 * 1024 * 1024
    }

    /// Get the maximum request body size in bytes.
    pub fn max_request_body_size_bytes(&self) -> usize {
        self.limits.max_request_body_size_mb * 1024 * 1024
    }
}

impl Default for Config {
    fn default() -> Self {
        serde_json::from_str(include_str!("../config.json")).unwrap_or_else(|e| {
            panic!("Failed to parse embedded config.json: {e}. This is a bug in the build - the embedded file should be valid.")
        })
    }
}
