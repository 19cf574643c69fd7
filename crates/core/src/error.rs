//! Error types for query diagnostics
//!
//! Only caller-initiated actions (activation, status queries) surface these
//! errors. Failures discovered while retiring a bundle in the background are
//! absorbed into the bundle's completed record instead.

use crate::types::QueryId;
use thiserror::Error;

/// Errors surfaced synchronously to the activation or status caller.
///
/// Every variant is raised before any shared state is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An activation parameter is outside its allowed range
    #[error("{message}")]
    Validation {
        /// Name of the offending parameter
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// A bundle for this query is already active
    #[error("Query diagnostics for query_id[ {query_id} ] is already being generated")]
    DuplicateBundle {
        /// Query that already has an active bundle
        query_id: QueryId,
    },

    /// The active-bundle registry is full
    #[error("too many active query diagnostics bundles (limit {limit})")]
    Capacity {
        /// Maximum number of simultaneously active bundles
        limit: usize,
    },

    /// The derived bundle path does not fit the platform path limit
    #[error("Path to data directory is too long ({length} bytes, limit {limit}); move the data directory to a shorter path")]
    PathConstruction {
        /// Length of the derived path in bytes
        length: usize,
        /// Maximum allowed length in bytes
        limit: usize,
    },

    /// Query diagnostics is disabled in configuration
    #[error("query diagnostics is not enabled")]
    NotEnabled,
}

impl Error {
    /// Create a validation error for `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Result type for query diagnostics operations.
pub type Result<T> = std::result::Result<T, Error>;
