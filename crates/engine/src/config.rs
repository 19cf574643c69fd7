//! Diagnostics configuration
//!
//! Loaded from TOML or built in code. Every key is optional:
//!
//! ```toml
//! enabled = true
//! data_root = "/var/lib/strata"
//! bg_worker_interval_ms = 1000
//! completed_log_budget_bytes = 65536
//! max_active_bundles = 100
//! bind_vars_capacity = 2048
//! ```
//!
//! Capacities are fixed once an engine is built from the config. Only the
//! reaper tick can be changed afterwards, through
//! [`DiagnosticsEngine::set_sweep_interval`](crate::DiagnosticsEngine::set_sweep_interval).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strata_qdiag_core::limits::{
    completed_log_capacity, DEFAULT_BG_WORKER_INTERVAL_MS, DEFAULT_BIND_VARS_CAPACITY,
    DEFAULT_COMPLETED_LOG_BUDGET_BYTES, DEFAULT_MAX_ACTIVE_BUNDLES,
};
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The config text is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Query diagnostics settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Feature gate for activation and status queries
    pub enabled: bool,
    /// Directory under which `query-diagnostics/` is created
    pub data_root: PathBuf,
    /// Reaper tick in milliseconds
    pub bg_worker_interval_ms: u64,
    /// Byte budget of the completed-bundle log
    pub completed_log_budget_bytes: usize,
    /// Maximum number of simultaneously active bundles
    pub max_active_bundles: usize,
    /// Per-bundle bind-variable buffer size in bytes
    pub bind_vars_capacity: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            data_root: PathBuf::from("."),
            bg_worker_interval_ms: DEFAULT_BG_WORKER_INTERVAL_MS,
            completed_log_budget_bytes: DEFAULT_COMPLETED_LOG_BUDGET_BYTES,
            max_active_bundles: DEFAULT_MAX_ACTIVE_BUNDLES,
            bind_vars_capacity: DEFAULT_BIND_VARS_CAPACITY,
        }
    }
}

impl DiagnosticsConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every value is in range.
    ///
    /// The bind-variable buffer needs room for at least one byte of data
    /// plus the reserved terminator slot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bg_worker_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "bg_worker_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_active_bundles == 0 {
            return Err(ConfigError::Invalid(
                "max_active_bundles must be greater than 0".to_string(),
            ));
        }
        if self.bind_vars_capacity < 2 {
            return Err(ConfigError::Invalid(format!(
                "bind_vars_capacity must be at least 2, got {}",
                self.bind_vars_capacity
            )));
        }
        Ok(())
    }

    /// Reaper tick as a duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.bg_worker_interval_ms)
    }

    /// Number of completed-bundle slots the byte budget allows
    pub fn completed_log_capacity(&self) -> usize {
        completed_log_capacity(self.completed_log_budget_bytes)
    }
}
