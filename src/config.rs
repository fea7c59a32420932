//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub sidebar: SidebarConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP / WebSocket server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_max_sessions() -> usize {
    256
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl ServerConfig {
    /// Socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Auth gate timing
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// How often to check whether the auth SDK is ready
    #[serde(default = "default_sdk_poll_interval")]
    pub sdk_poll_interval_ms: u64,

    /// Give up waiting for the SDK after this long
    #[serde(default = "default_sdk_max_wait")]
    pub sdk_max_wait_ms: u64,

    /// Hide the loading overlay after this long if auth has not resolved
    #[serde(default = "default_overlay_fallback")]
    pub overlay_fallback_ms: u64,
}

fn default_sdk_poll_interval() -> u64 {
    150
}

fn default_sdk_max_wait() -> u64 {
    5000
}

fn default_overlay_fallback() -> u64 {
    1500
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            sdk_poll_interval_ms: default_sdk_poll_interval(),
            sdk_max_wait_ms: default_sdk_max_wait(),
            overlay_fallback_ms: default_overlay_fallback(),
        }
    }
}

/// Sidebar drawer behavior
#[derive(Debug, Clone, Deserialize)]
pub struct SidebarConfig {
    /// Viewports at or below this width use the toggleable drawer
    #[serde(default = "default_breakpoint")]
    pub breakpoint_px: u32,
}

fn default_breakpoint() -> u32 {
    1024
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: default_breakpoint(),
        }
    }
}

/// Live metric rendering
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Entries shown in the recent activity list
    #[serde(default = "default_activity_limit")]
    pub activity_limit: usize,

    /// Currency marker for the asset total
    #[serde(default = "default_currency_prefix")]
    pub currency_prefix: String,

    /// Offset (minutes east of UTC) used to decide what "today" is
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_activity_limit() -> usize {
    6
}

fn default_currency_prefix() -> String {
    crate::format::DEFAULT_CURRENCY_PREFIX.to_string()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            activity_limit: default_activity_limit(),
            currency_prefix: default_currency_prefix(),
            utc_offset_minutes: 0,
        }
    }
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

impl DashboardConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = DashboardConfig::default();
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
            dirs::config_dir().map(|p| p.join("ppm-dashboard").join("config.toml")),
            Some(PathBuf::from("./ppm-dashboard.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("PPM_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PPM_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(offset) = std::env::var("PPM_UTC_OFFSET_MINUTES") {
            if let Ok(minutes) = offset.parse() {
                self.metrics.utc_offset_minutes = minutes;
            }
        }
        if let Ok(prefix) = std::env::var("PPM_CURRENCY_PREFIX") {
            self.metrics.currency_prefix = prefix;
        }

        if let Ok(level) = std::env::var("PPM_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("PPM_LOG_FORMAT") {
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
    r#"# PPM Dashboard Configuration
#
# Environment variables override these settings:
# - PPM_HOST
# - PPM_PORT
# - PPM_UTC_OFFSET_MINUTES
# - PPM_CURRENCY_PREFIX
# - PPM_LOG_LEVEL
# - PPM_LOG_FORMAT

[server]
host = "0.0.0.0"
port = 8090

# Maximum concurrent browser sessions
max_sessions = 256

[auth]
# Poll interval while waiting for the auth SDK (ms)
sdk_poll_interval_ms = 150

# Stop waiting for the SDK after this long (ms)
sdk_max_wait_ms = 5000

# Unblock the login overlay if auth has not resolved (ms)
overlay_fallback_ms = 1500

[sidebar]
# Drawer is toggleable at or below this viewport width
breakpoint_px = 1024

[metrics]
# Entries in the recent activity list
activity_limit = 6

# Currency marker for the asset total
currency_prefix = "Rp"

# Offset from UTC used to decide "today" (minutes, e.g. 420 for UTC+7)
utc_offset_minutes = 0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
