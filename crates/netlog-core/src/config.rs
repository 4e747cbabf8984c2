//! Configuration management for netlog.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/netlog/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Net session settings
    pub net: NetConfig,
    /// Registry lookup settings
    pub lookup: LookupConfig,
    /// Check-in storage settings
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `NETLOG_REPEATER`: Override the default repeater
    /// - `NETLOG_DATABASE`: Override the check-in database path
    /// - `NETLOG_CONNECT_TIMEOUT_SECS`: Override the registry connect timeout
    /// - `NETLOG_READ_TIMEOUT_SECS`: Override the registry read timeout
    pub fn load_with_env(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("NETLOG_REPEATER") {
            let val = val.trim().to_uppercase();
            if !val.is_empty() {
                tracing::debug!("Override net.default_repeater from env: {}", val);
                self.net.default_repeater = val;
            }
        }

        if let Some(val) = var("NETLOG_DATABASE") {
            tracing::debug!("Override database.path from env: {}", val);
            self.database.path = Some(PathBuf::from(val));
        }

        if let Some(val) = var("NETLOG_CONNECT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.lookup.connect_timeout_secs = secs;
                tracing::debug!("Override lookup.connect_timeout_secs from env: {}", secs);
            }
        }

        if let Some(val) = var("NETLOG_READ_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.lookup.read_timeout_secs = secs;
                tracing::debug!("Override lookup.read_timeout_secs from env: {}", secs);
            }
        }
    }

    /// Check values that would otherwise fail later at runtime.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.net.default_repeater.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "net.default_repeater".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.lookup.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "lookup.connect_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.lookup.read_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "lookup.read_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/netlog/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "netlog", "netlog").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/netlog`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("org", "netlog", "netlog").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Resolve the database file, defaulting to `checkins.db` in the data directory.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("checkins.db")),
        }
    }
}

/// Net session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Repeater used when the operator accepts the default
    pub default_repeater: String,
    /// Skip the repeater prompt entirely
    pub accept_defaults: bool,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            default_repeater: "VE7RVF".to_string(),
            accept_defaults: false,
        }
    }
}

/// Registry lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds
    pub read_timeout_secs: u64,
    /// User agent string sent to both registries
    pub user_agent: String,
    /// Base of the American (FCC ULS) search application
    pub american_base_url: String,
    /// Base of the Canadian (ISED) amateur query application
    pub canadian_base_url: String,
}

impl LookupConfig {
    /// Connect timeout as a `Duration`.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Read timeout as a `Duration`.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            read_timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            american_base_url: "https://wireless2.fcc.gov/UlsApp/UlsSearch/".to_string(),
            canadian_base_url: "https://apc-cap.ic.gc.ca/pls/apc_anon/".to_string(),
        }
    }
}

/// Check-in storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file; `None` means `checkins.db` in the data directory
    pub path: Option<PathBuf>,
}
