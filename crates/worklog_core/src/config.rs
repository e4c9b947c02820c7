//! Engine configuration.
//!
//! # Responsibility
//! - Describe tunables (logging, database location, preset ranking).
//! - Load them from TOML with per-field defaults.
//!
//! # Invariants
//! - A missing or partial file never fails; absent keys take defaults.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE_FILE: &str = "worklog.sqlite3";
const DEFAULT_PRESET_LIMIT: usize = 4;
const DEFAULT_PRESET_LOOKBACK_DAYS: u32 = 30;

/// Configuration loading error.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Toml(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Toml(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Toml(err) => Some(err),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Toml(value)
    }
}

/// Preset ranking settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    /// Default number of presets returned when the caller gives no limit.
    pub limit: usize,
    /// How far back, in days, history is considered.
    pub lookback_days: u32,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PRESET_LIMIT,
            lookback_days: DEFAULT_PRESET_LOOKBACK_DAYS,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub database_path: PathBuf,
    pub presets: PresetConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            presets: PresetConfig::default(),
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
