//! Unified error types for query diagnostics.
//!
//! This module provides a clean error type that wraps internal errors
//! and presents a consistent interface to users.

use strata_qdiag_engine::ConfigError;
use thiserror::Error;

/// All query diagnostics errors.
///
/// Only activation, status queries and setup fail. Problems found while
/// retiring a bundle are recorded in its status row instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Activation parameter out of range
    #[error("{message}")]
    Validation {
        /// Offending parameter
        field: &'static str,
        /// Reason
        message: String,
    },

    /// The query already has an active bundle
    #[error("Query diagnostics for query_id[ {query_id} ] is already being generated")]
    Duplicate {
        /// Query id
        query_id: i64,
    },

    /// Too many active bundles
    #[error("too many active query diagnostics bundles (limit {limit})")]
    Capacity {
        /// Registry capacity
        limit: usize,
    },

    /// Bundle path would exceed the platform path limit
    #[error("Path to data directory is too long ({length} bytes, limit {limit}); move the data directory to a shorter path")]
    PathTooLong {
        /// Derived path length in bytes
        length: usize,
        /// Maximum allowed length
        limit: usize,
    },

    /// Query diagnostics is disabled
    #[error("query diagnostics is not enabled")]
    NotEnabled,

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for query diagnostics operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a duplicate-activation error.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::Duplicate { .. })
    }

    /// Check if this is a capacity error.
    pub fn is_capacity(&self) -> bool {
        matches!(self, Error::Capacity { .. })
    }

    /// Check if this is a parameter validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

// Convert from internal core errors
impl From<strata_qdiag_core::Error> for Error {
    fn from(e: strata_qdiag_core::Error) -> Self {
        use strata_qdiag_core::Error as CoreError;
        match e {
            CoreError::Validation { field, message } => Error::Validation { field, message },
            CoreError::DuplicateBundle { query_id } => Error::Duplicate {
                query_id: query_id.as_i64(),
            },
            CoreError::Capacity { limit } => Error::Capacity { limit },
            CoreError::PathConstruction { length, limit } => Error::PathTooLong { length, limit },
            CoreError::NotEnabled => Error::NotEnabled,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
