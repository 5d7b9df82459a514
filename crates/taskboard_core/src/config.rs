//! Board runtime configuration.
//!
//! # Responsibility
//! - Describe adapter latency/failure simulation and storage/log locations.
//! - Load settings from a JSON file with per-field defaults.
//!
//! # Invariants
//! - `failure_rate` is always within `[0.0, 1.0]` after `validate()`.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_LIST_LATENCY_MS: u64 = 300;
const DEFAULT_WRITE_LATENCY_MS: u64 = 200;
const DEFAULT_DB_FILE_NAME: &str = "taskboard.sqlite3";

/// Simulated network behavior of the persistence adapter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterConfig {
    /// Delay applied before `get_all` resolves.
    pub list_latency_ms: u64,
    /// Delay applied before create/update/delete resolve.
    pub write_latency_ms: u64,
    /// Probability that any call fails with a transport error.
    pub failure_rate: f64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            list_latency_ms: DEFAULT_LIST_LATENCY_MS,
            write_latency_ms: DEFAULT_WRITE_LATENCY_MS,
            failure_rate: 0.0,
        }
    }
}

impl AdapterConfig {
    /// No latency and no random failures.
    pub fn instant() -> Self {
        Self {
            list_latency_ms: 0,
            write_latency_ms: 0,
            failure_rate: 0.0,
        }
    }

    pub fn list_latency(&self) -> Duration {
        Duration::from_millis(self.list_latency_ms)
    }

    pub fn write_latency(&self) -> Duration {
        Duration::from_millis(self.write_latency_ms)
    }
}

/// Top-level configuration for a board process.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    pub db_path: PathBuf,
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub adapter: AdapterConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: None,
            log_dir: None,
            adapter: AdapterConfig::default(),
        }
    }
}

impl BoardConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.adapter.failure_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidFailureRate(rate));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    InvalidFailureRate(f64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidFailureRate(rate) => {
                write!(f, "failure_rate must be within 0.0..=1.0, got {rate}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidFailureRate(_) => None,
        }
    }
}
