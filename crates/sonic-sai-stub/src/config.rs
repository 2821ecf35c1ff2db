//! Configuration for the LAG stub.
//!
//! Loaded from TOML, then optionally overridden by switch-profile keys at
//! initialization. Default location: /etc/sonic/sai-lag-stub.conf

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Profile key selecting the storage strategy.
pub const PROFILE_KEY_DB_STRATEGY: &str = "SAI_LAG_DB_STRATEGY";
/// Profile key for the fixed LAG capacity.
pub const PROFILE_KEY_MAX_LAGS: &str = "SAI_LAG_MAX_LAGS";
/// Profile key for the fixed LAG member capacity.
pub const PROFILE_KEY_MAX_MEMBERS: &str = "SAI_LAG_MAX_MEMBERS";

/// Largest accepted fixed LAG capacity.
pub const MAX_FIXED_LAGS: usize = 1024;
/// Largest accepted fixed LAG member capacity.
///
/// Every LAG slot carries one back-reference per member slot, so the fixed
/// tables hold `max_lags * max_lag_members` identifiers.
pub const MAX_FIXED_MEMBERS: usize = 4096;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// How LAG and LAG member records are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LagDbStrategy {
    /// Preallocated tables with first-fit slot search.
    #[default]
    Fixed,
    /// Growable LAG table; members live inside their LAG.
    Dynamic,
}

impl FromStr for LagDbStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "dynamic" => Ok(Self::Dynamic),
            _ => Err(ConfigError::InvalidValue {
                key: PROFILE_KEY_DB_STRATEGY.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LagDbStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// LAG database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagDbConfig {
    /// Storage strategy
    #[serde(default)]
    pub strategy: LagDbStrategy,

    /// Number of LAG slots (fixed strategy)
    #[serde(default = "default_max_lags")]
    pub max_lags: usize,

    /// Number of LAG member slots (fixed strategy)
    #[serde(default = "default_max_lag_members")]
    pub max_lag_members: usize,
}

/// Complete stub configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StubConfig {
    #[serde(default)]
    pub lag: LagDbConfig,
}

fn default_max_lags() -> usize {
    5
}

fn default_max_lag_members() -> usize {
    16
}

impl Default for LagDbConfig {
    fn default() -> Self {
        Self {
            strategy: LagDbStrategy::default(),
            max_lags: default_max_lags(),
            max_lag_members: default_max_lag_members(),
        }
    }
}

impl LagDbConfig {
    /// Applies one switch-profile key.
    ///
    /// Returns `Ok(false)` for keys this config does not own.
    pub fn set_from_profile(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            PROFILE_KEY_DB_STRATEGY => self.strategy = value.parse()?,
            PROFILE_KEY_MAX_LAGS => self.max_lags = parse_count(key, value)?,
            PROFILE_KEY_MAX_MEMBERS => self.max_lag_members = parse_count(key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Validate configuration
    ///
    /// Fixed capacities must lie in `1..=MAX_FIXED_LAGS` and
    /// `1..=MAX_FIXED_MEMBERS`. The dynamic strategy ignores them.
    pub fn validate(&self) -> Result<()> {
        if self.strategy == LagDbStrategy::Fixed {
            check_capacity("max_lags", self.max_lags, MAX_FIXED_LAGS)?;
            check_capacity("max_lag_members", self.max_lag_members, MAX_FIXED_MEMBERS)?;
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn check_capacity(name: &str, value: usize, max: usize) -> Result<()> {
    if value == 0 || value > max {
        return Err(ConfigError::Invalid(format!(
            "{} must be between 1 and {}, got {}",
            name, max, value
        )));
    }
    Ok(())
}

impl StubConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| match e {
                ConfigError::Parse { message, .. } => ConfigError::Parse {
                    path: path.display().to_string(),
                    message,
                },
                other => other,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.lag.validate()
    }
}
