//! Configuration for evalcache.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::EvalResult;

/// Main configuration for evalcache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Adaptive cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Call recorder settings.
    #[serde(default)]
    pub recorder: RecorderConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

/// Adaptive cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Wrap the objective in an adaptive cache.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Storage backend for call logs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogBackend {
    /// A JSON array rewritten on every call.
    #[default]
    Json,
    /// An SQLite table rewritten on every call.
    Sqlite,
}

impl std::fmt::Display for LogBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogBackend::Json => write!(f, "json"),
            LogBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for LogBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogBackend::Json),
            "sqlite" => Ok(LogBackend::Sqlite),
            other => Err(format!("unknown log backend '{}'", other)),
        }
    }
}

/// Call recorder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Record every call to the objective.
    #[serde(default)]
    pub enabled: bool,

    /// Log destination.
    #[serde(default = "default_log_path")]
    pub path: PathBuf,

    /// Storage backend.
    #[serde(default)]
    pub backend: LogBackend,

    /// Truncate an existing log when the recorder is created.
    #[serde(default = "default_true")]
    pub reset: bool,

    /// Emit the call index before each recorded call.
    #[serde(default)]
    pub announce_index: bool,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            backend: LogBackend::default(),
            reset: true,
            announce_index: false,
        }
    }
}

fn default_log_path() -> PathBuf {
    PathBuf::from(".evalcache/calls.json")
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> EvalResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> EvalResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            recorder: RecorderConfig::default(),
        }
    }

    /// Tries to load configuration from current directory or uses default.
    pub fn load_or_default() -> Self {
        Self::load("evalcache.toml").unwrap_or_else(|_| Self::default_config())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
