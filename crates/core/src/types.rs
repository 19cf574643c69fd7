//! Core types for query diagnostics
//!
//! This module defines the fundamental types used throughout the system:
//! - [`QueryId`]: Identifier of a normalized query
//! - [`DiagnosticsParams`]: Activation parameters, validated on construction
//! - [`BundleMetadata`]: Parameters plus start time and output path
//! - [`BundleStatus`]: In-progress / success / error labels
//! - [`Description`]: Outcome text bounded to [`DESCRIPTION_LEN`] - 1 bytes

use crate::error::{Error, Result};
use crate::limits::DESCRIPTION_LEN;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a normalized query
///
/// Identical queries (modulo constants) share the same identifier. Zero is
/// reserved and never names a real query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryId(i64);

impl QueryId {
    /// Wrap a raw identifier
    pub const fn new(raw: i64) -> Self {
        QueryId(raw)
    }

    /// Raw identifier value
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Check whether this is the reserved zero identifier
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<i64> for QueryId {
    fn from(raw: i64) -> Self {
        QueryId(raw)
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters of one diagnostics activation
///
/// Immutable once built. The only way to obtain one is through
/// [`DiagnosticsParams::builder`], which validates every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsParams {
    query_id: QueryId,
    interval_sec: i64,
    explain_sample_rate: i64,
    explain_analyze: bool,
    explain_dist: bool,
    explain_debug: bool,
    bind_var_min_duration_ms: i64,
}

impl DiagnosticsParams {
    /// Start building parameters for `query_id`
    pub fn builder(query_id: impl Into<QueryId>) -> DiagnosticsParamsBuilder {
        DiagnosticsParamsBuilder::new(query_id.into())
    }

    /// Query the bundle captures
    pub fn query_id(&self) -> QueryId {
        self.query_id
    }

    /// Capture time-to-live in seconds (always > 0)
    pub fn interval_sec(&self) -> i64 {
        self.interval_sec
    }

    /// Percentage of executions to explain, in `[0, 100]`
    pub fn explain_sample_rate(&self) -> i64 {
        self.explain_sample_rate
    }

    /// Whether EXPLAIN ANALYZE was requested
    pub fn explain_analyze(&self) -> bool {
        self.explain_analyze
    }

    /// Whether EXPLAIN (DIST) was requested
    pub fn explain_dist(&self) -> bool {
        self.explain_dist
    }

    /// Whether EXPLAIN (DEBUG) was requested
    pub fn explain_debug(&self) -> bool {
        self.explain_debug
    }

    /// Executions faster than this many milliseconds are not recorded
    pub fn bind_var_min_duration_ms(&self) -> i64 {
        self.bind_var_min_duration_ms
    }
}

/// Builder for [`DiagnosticsParams`]
///
/// Unset fields take the activation defaults: a 300 second window, a 1%
/// explain sample rate, no explain detail flags, and a 10 ms bind-variable
/// threshold.
#[derive(Debug, Clone)]
pub struct DiagnosticsParamsBuilder {
    query_id: QueryId,
    interval_sec: i64,
    explain_sample_rate: i64,
    explain_analyze: bool,
    explain_dist: bool,
    explain_debug: bool,
    bind_var_min_duration_ms: i64,
}

impl DiagnosticsParamsBuilder {
    fn new(query_id: QueryId) -> Self {
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

    /// Capture window in seconds
    pub fn interval_sec(mut self, secs: i64) -> Self {
        self.interval_sec = secs;
        self
    }

    /// Percentage of executions to explain
    pub fn explain_sample_rate(mut self, rate: i64) -> Self {
        self.explain_sample_rate = rate;
        self
    }

    /// Request EXPLAIN ANALYZE output
    pub fn explain_analyze(mut self, on: bool) -> Self {
        self.explain_analyze = on;
        self
    }

    /// Request EXPLAIN (DIST) output
    pub fn explain_dist(mut self, on: bool) -> Self {
        self.explain_dist = on;
        self
    }

    /// Request EXPLAIN (DEBUG) output
    pub fn explain_debug(mut self, on: bool) -> Self {
        self.explain_debug = on;
        self
    }

    /// Minimum execution time (ms) for bind variables to be recorded
    pub fn bind_var_min_duration_ms(mut self, ms: i64) -> Self {
        self.bind_var_min_duration_ms = ms;
        self
    }

    /// Validate and build.
    ///
    /// Checks run in a fixed order (query id, interval, sample rate, bind
    /// threshold) so the first failing field is always the one reported.
    pub fn build(self) -> Result<DiagnosticsParams> {
        if self.query_id.is_zero() {
            return Err(Error::validation(
                "query_id",
                "there cannot be a query with query_id 0",
            ));
        }
        if self.interval_sec <= 0 {
            return Err(Error::validation(
                "diagnostics_interval_sec",
                "diagnostics_interval_sec should be greater than 0",
            ));
        }
        if !(0..=100).contains(&self.explain_sample_rate) {
            return Err(Error::validation(
                "explain_sample_rate",
                "explain_sample_rate should be between 0 and 100",
            ));
        }
        if self.bind_var_min_duration_ms < 0 {
            return Err(Error::validation(
                "bind_var_query_min_duration_ms",
                "bind_var_query_min_duration_ms cannot be less than 0",
            ));
        }

        Ok(DiagnosticsParams {
            query_id: self.query_id,
            interval_sec: self.interval_sec,
            explain_sample_rate: self.explain_sample_rate,
            explain_analyze: self.explain_analyze,
            explain_dist: self.explain_dist,
            explain_debug: self.explain_debug,
            bind_var_min_duration_ms: self.bind_var_min_duration_ms,
        })
    }
}

/// Immutable description of one diagnostics bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMetadata {
    params: DiagnosticsParams,
    start_time: DateTime<Utc>,
    output_path: String,
}

impl BundleMetadata {
    /// Create metadata from validated params, the activation instant and
    /// the already-derived output directory.
    pub fn new(params: DiagnosticsParams, start_time: DateTime<Utc>, output_path: String) -> Self {
        Self {
            params,
            start_time,
            output_path,
        }
    }

    /// Activation parameters
    pub fn params(&self) -> &DiagnosticsParams {
        &self.params
    }

    /// Query the bundle captures
    pub fn query_id(&self) -> QueryId {
        self.params.query_id
    }

    /// When the bundle was activated
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Directory the bundle is written to
    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    /// Instant at which the bundle expires.
    ///
    /// `None` only when the window runs past the representable time range,
    /// in which case the bundle never expires.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Duration::try_seconds(self.params.interval_sec)
            .and_then(|window| self.start_time.checked_add_signed(window))
    }

    /// `now >= start_time + interval_sec`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|deadline| now >= deadline)
    }
}

/// Status of a bundle as reported to status queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BundleStatus {
    /// Bundle retired and its data (if any) was written
    Success,
    /// Bundle is still capturing
    InProgress,
    /// Bundle retired but its data could not be written
    Error,
}

impl BundleStatus {
    /// Display label used in status rows
    pub fn label(&self) -> &'static str {
        match self {
            BundleStatus::Success => "Success",
            BundleStatus::InProgress => "In Progress",
            BundleStatus::Error => "Error",
        }
    }
}

impl fmt::Display for BundleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal outcome of a retired bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionStatus {
    /// Data written, or nothing to write
    Success,
    /// Persistence failed
    Error,
}

impl From<CompletionStatus> for BundleStatus {
    fn from(status: CompletionStatus) -> Self {
        match status {
            CompletionStatus::Success => BundleStatus::Success,
            CompletionStatus::Error => BundleStatus::Error,
        }
    }
}

/// Outcome description, truncated to at most `DESCRIPTION_LEN - 1` bytes
///
/// Truncation always lands on a UTF-8 character boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Description(String);

impl Description {
    /// Maximum stored length in bytes
    pub const MAX_LEN: usize = DESCRIPTION_LEN - 1;

    /// Build a description, truncating overlong text
    pub fn new(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if text.len() > Self::MAX_LEN {
            let mut end = Self::MAX_LEN;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }
        Description(text)
    }

    /// Empty description
    pub fn empty() -> Self {
        Description(String::new())
    }

    /// Description text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
