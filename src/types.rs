//! Public types for the query diagnostics API.
//!
//! This module re-exports types from internal crates with a clean public
//! interface, plus [`ActivationRequest`], the caller-facing form of an
//! activation.

use strata_qdiag_core::{DiagnosticsParams, Result};

// Core types
pub use strata_qdiag_core::{BindValue, BundleStatus, QueryId};

// Execution hook outcome
pub use strata_qdiag_concurrency::AppendOutcome;

// Engine types
pub use strata_qdiag_engine::{DiagnosticsConfig, ReapSummary, StatusRow};

/// Arguments of one activation, as supplied by the caller.
///
/// Values are taken raw and validated when the request is submitted.
/// Unset fields default to a 300 second window, a 1% explain sample rate,
/// no explain flags and a 10 ms bind-variable threshold.
///
/// # Example
///
/// ```ignore
/// let request = ActivationRequest::new(42)
///     .interval_sec(60)
///     .bind_var_min_duration_ms(0);
/// let path = qd.activate(&request)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRequest {
    /// Query to capture; must be non-zero
    pub query_id: i64,
    /// Capture window in seconds; must be positive
    pub interval_sec: i64,
    /// Percentage in 0..=100
    pub explain_sample_rate: i64,
    /// Collect EXPLAIN ANALYZE
    pub explain_analyze: bool,
    /// Collect distributed plan information
    pub explain_dist: bool,
    /// Collect debug plan information
    pub explain_debug: bool,
    /// Minimum execution time to record, in milliseconds; must be >= 0
    pub bind_var_min_duration_ms: i64,
}

impl ActivationRequest {
    /// Request for `query_id` with default settings
    pub fn new(query_id: i64) -> Self {
        Self {
            query_id,
            interval_sec: 300,
            explain_sample_rate: 1,
            explain_analyze: false,
            explain_dist: false,
            explain_debug: false,
            bind_var_min_duration_ms: 10,
        }
    }

    /// Set the capture window
    pub fn interval_sec(mut self, secs: i64) -> Self {
        self.interval_sec = secs;
        self
    }

    /// Set the explain sample rate
    pub fn explain_sample_rate(mut self, rate: i64) -> Self {
        self.explain_sample_rate = rate;
        self
    }

    /// Toggle EXPLAIN ANALYZE
    pub fn explain_analyze(mut self, on: bool) -> Self {
        self.explain_analyze = on;
        self
    }

    /// Toggle distributed plan collection
    pub fn explain_dist(mut self, on: bool) -> Self {
        self.explain_dist = on;
        self
    }

    /// Toggle debug plan collection
    pub fn explain_debug(mut self, on: bool) -> Self {
        self.explain_debug = on;
        self
    }

    /// Set the bind-variable threshold
    pub fn bind_var_min_duration_ms(mut self, ms: i64) -> Self {
        self.bind_var_min_duration_ms = ms;
        self
    }

    /// Validate into engine parameters
    pub(crate) fn to_params(&self) -> Result<DiagnosticsParams> {
        DiagnosticsParams::builder(self.query_id)
            .interval_sec(self.interval_sec)
            .explain_sample_rate(self.explain_sample_rate)
            .explain_analyze(self.explain_analyze)
            .explain_dist(self.explain_dist)
            .explain_debug(self.explain_debug)
            .bind_var_min_duration_ms(self.bind_var_min_duration_ms)
            .build()
    }
}
