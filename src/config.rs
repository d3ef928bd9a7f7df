//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// No timeout when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

/// Dashboard timing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_resize_debounce")]
    pub resize_debounce_ms: u64,

    #[serde(default = "default_card_stagger")]
    pub card_stagger_ms: u64,

    #[serde(default = "default_print_settle")]
    pub print_settle_ms: u64,

    #[serde(default)]
    pub real_time_updates: bool,

    #[serde(default = "default_update_interval")]
    pub update_interval_minutes: u64,
}

fn default_resize_debounce() -> u64 {
    250
}

fn default_card_stagger() -> u64 {
    150
}

fn default_print_settle() -> u64 {
    250
}

fn default_update_interval() -> u64 {
    5
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: default_resize_debounce(),
            card_stagger_ms: default_card_stagger(),
            print_settle_ms: default_print_settle(),
            real_time_updates: false,
            update_interval_minutes: default_update_interval(),
        }
    }
}

impl DashboardConfig {
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn card_stagger(&self) -> Duration {
        Duration::from_millis(self.card_stagger_ms)
    }

    pub fn print_settle(&self) -> Duration {
        Duration::from_millis(self.print_settle_ms)
    }
}

/// Output directory for exports and printed reports
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

fn default_output_dir() -> String {
    dirs::download_dir()
        .map(|p| p.join("finboard").to_string_lossy().to_string())
        .unwrap_or_else(|| "./finboard_output".to_string())
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl OutputConfig {
    /// Output directory with a leading `~/` expanded to the home directory
    pub fn dir_path(&self) -> PathBuf {
        expand_home(&self.dir)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
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

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
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
            dirs::config_dir().map(|p| p.join("finboard").join("config.toml")),
            Some(PathBuf::from("/etc/finboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
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
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("FINBOARD_API_URL") {
            self.api.base_url = url;
        }
        if let Some(secs) = var("FINBOARD_REQUEST_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse() {
                self.api.request_timeout_secs = Some(s);
            }
        }

        if let Some(dir) = var("FINBOARD_OUTPUT_DIR") {
            self.output.dir = dir;
        }

        if let Some(level) = var("FINBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FINBOARD_LOG_FORMAT") {
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
    r#"# finboard Configuration
#
# Environment variables override these settings:
# - FINBOARD_API_URL
# - FINBOARD_REQUEST_TIMEOUT_SECS
# - FINBOARD_OUTPUT_DIR
# - FINBOARD_LOG_LEVEL
# - FINBOARD_LOG_FORMAT

[api]
# Analytics backend serving /api/charts/* and /api/summary
base_url = "http://localhost:5000"

# Per-request timeout in seconds (no timeout when unset)
# request_timeout_secs = 30

[dashboard]
# Quiet period before a burst of viewport changes triggers one resize pass (ms)
resize_debounce_ms = 250

# Delay between summary card reveals (ms)
card_stagger_ms = 150

# Delay between building a print document and printing it (ms)
print_settle_ms = 250

# Periodic update check (logs only)
real_time_updates = false
update_interval_minutes = 5

[output]
# Directory receiving exports and printed reports
dir = "~/Downloads/finboard"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty, json
format = "pretty"
"#
    .to_string()
}
