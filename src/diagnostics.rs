//! Main entry point for query diagnostics.
//!
//! This module provides the `QueryDiagnostics` struct, which owns the
//! diagnostics state and the background reaper.

use crate::error::{Error, Result};
use crate::types::{
    ActivationRequest, AppendOutcome, BindValue, DiagnosticsConfig, ReapSummary, StatusRow,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use strata_qdiag_core::QueryId;
use strata_qdiag_engine::{DiagnosticsEngine, ExpiryReaper, ReaperHandle};
use tracing::info;

/// Query diagnostics for one data directory.
///
/// Create it with [`QueryDiagnostics::open`] or [`QueryDiagnostics::builder`].
/// Share it between threads by reference or `Arc`; every method takes
/// `&self`.
///
/// # Example
///
/// ```ignore
/// use strata_qdiag::prelude::*;
///
/// let qd = QueryDiagnostics::open("/var/lib/strata")?;
///
/// // Capture query 42 for one minute
/// let path = qd.activate(&ActivationRequest::new(42).interval_sec(60))?;
///
/// // From the executor, after each query finishes
/// qd.on_execution_end(42, elapsed, &[BindValue::Int(7)]);
///
/// for row in qd.status()? {
///     println!("{} {} {}", row.query_id, row.status, row.path);
/// }
///
/// qd.close()?;
/// ```
pub struct QueryDiagnostics {
    engine: Arc<DiagnosticsEngine>,
    reaper: Mutex<Option<ReaperHandle>>,
}

impl QueryDiagnostics {
    /// Open diagnostics rooted at `data_root` with default settings and a
    /// running reaper.
    pub fn open(data_root: impl AsRef<Path>) -> Result<Self> {
        Self::builder().data_root(data_root).open()
    }

    /// Create a builder for diagnostics configuration.
    pub fn builder() -> QueryDiagnosticsBuilder {
        QueryDiagnosticsBuilder::new()
    }

    /// Start capturing a query.
    ///
    /// Returns the bundle directory. Fails if diagnostics is disabled, a
    /// parameter is out of range, the path is too long, the query already
    /// has a bundle, or too many bundles are active.
    pub fn activate(&self, request: &ActivationRequest) -> Result<String> {
        if !self.engine.is_enabled() {
            return Err(Error::NotEnabled);
        }
        let params = request.to_params()?;
        let bundle = self.engine.activate(params)?;
        Ok(bundle.output_path().to_string())
    }

    /// Record the end of one query execution.
    ///
    /// Call this for every execution; unmatched query ids return after a
    /// single lookup. Never fails. See
    /// [`DiagnosticsEngine::on_execution_end`] for the return value.
    #[inline]
    pub fn on_execution_end(
        &self,
        query_id: i64,
        elapsed: Duration,
        params: &[BindValue],
    ) -> Option<AppendOutcome> {
        self.engine.on_execution_end(QueryId::new(query_id), elapsed, params)
    }

    /// One row per active bundle, then one per retained completed bundle.
    pub fn status(&self) -> Result<Vec<StatusRow>> {
        self.engine.status().map_err(Into::into)
    }

    /// Retire expired bundles now, in addition to the reaper's schedule.
    pub fn run_expiry_pass(&self) -> ReapSummary {
        ExpiryReaper::run_pass(&self.engine)
    }

    /// Retire bundles expired at `now`.
    pub fn run_expiry_pass_at(&self, now: DateTime<Utc>) -> ReapSummary {
        ExpiryReaper::run_pass_at(&self.engine, now)
    }

    /// Change the reaper tick.
    pub fn set_sweep_interval(&self, interval: Duration) -> Result<()> {
        self.engine.set_sweep_interval(interval).map_err(Into::into)
    }

    /// Current reaper tick.
    pub fn sweep_interval(&self) -> Duration {
        self.engine.sweep_interval()
    }

    /// Configuration in effect.
    pub fn config(&self) -> &DiagnosticsConfig {
        self.engine.config()
    }

    /// Data directory bundles are written under.
    pub fn data_root(&self) -> &Path {
        &self.engine.config().data_root
    }

    /// Check if the background reaper is running.
    pub fn is_reaper_running(&self) -> bool {
        self.reaper
            .lock()
            .as_ref()
            .map_or(false, ReaperHandle::is_running)
    }

    /// Underlying engine, for embedding in an executor.
    pub fn engine(&self) -> &Arc<DiagnosticsEngine> {
        &self.engine
    }

    /// Stop the background reaper.
    ///
    /// Active bundles are left as they are; they can still be retired with
    /// [`run_expiry_pass`](Self::run_expiry_pass). Calling this twice is
    /// harmless.
    pub fn close(&self) -> Result<()> {
        let reaper = self.reaper.lock().take();
        if let Some(reaper) = reaper {
            reaper.stop();
            info!(
                active = self.engine.registry().len(),
                "Query diagnostics closed"
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for QueryDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryDiagnostics")
            .field("engine", &self.engine)
            .field("reaper_running", &self.is_reaper_running())
            .finish()
    }
}

/// Builder for diagnostics configuration.
///
/// # Example
///
/// ```ignore
/// // Production: reaper ticking every second
/// let qd = QueryDiagnostics::builder()
///     .data_root("/var/lib/strata")
///     .open()?;
///
/// // Tests: drive expiry by hand
/// let qd = QueryDiagnostics::builder()
///     .data_root(temp.path())
///     .without_reaper()
///     .open()?;
/// ```
pub struct QueryDiagnosticsBuilder {
    config: DiagnosticsConfig,
    spawn_reaper: bool,
}

impl QueryDiagnosticsBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: DiagnosticsConfig::default(),
            spawn_reaper: true,
        }
    }

    /// Replace every setting with `config`.
    pub fn config(mut self, config: DiagnosticsConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the data directory.
    pub fn data_root(mut self, path: impl AsRef<Path>) -> Self {
        self.config.data_root = PathBuf::from(path.as_ref());
        self
    }

    /// Turn the feature gate on or off.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Set the reaper tick in milliseconds.
    pub fn sweep_interval_ms(mut self, millis: u64) -> Self {
        self.config.bg_worker_interval_ms = millis;
        self
    }

    /// Set the completed-log byte budget.
    pub fn completed_log_budget_bytes(mut self, bytes: usize) -> Self {
        self.config.completed_log_budget_bytes = bytes;
        self
    }

    /// Set the maximum number of active bundles.
    pub fn max_active_bundles(mut self, max: usize) -> Self {
        self.config.max_active_bundles = max;
        self
    }

    /// Set the per-bundle bind-variable buffer size.
    pub fn bind_vars_capacity(mut self, bytes: usize) -> Self {
        self.config.bind_vars_capacity = bytes;
        self
    }

    /// Do not start the background reaper.
    ///
    /// Bundles are then only retired by explicit expiry passes.
    pub fn without_reaper(mut self) -> Self {
        self.spawn_reaper = false;
        self
    }

    /// Validate the configuration and start diagnostics.
    ///
    /// The reaper is not started when diagnostics is disabled.
    pub fn open(self) -> Result<QueryDiagnostics> {
        let engine = Arc::new(DiagnosticsEngine::new(self.config)?);

        let reaper = if self.spawn_reaper && engine.is_enabled() {
            Some(ReaperHandle::spawn(Arc::clone(&engine))?)
        } else {
            None
        };

        Ok(QueryDiagnostics {
            engine,
            reaper: Mutex::new(reaper),
        })
    }
}

impl Default for QueryDiagnosticsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
