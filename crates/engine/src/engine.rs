//! Diagnostics context
//!
//! [`DiagnosticsEngine`] owns the shared state of query diagnostics: the
//! active registry, the completed log, and the configuration they were
//! sized from. It is built once and shared by `Arc` between execution
//! threads, the reaper and status callers.
//!
//! # Example
//!
//! ```ignore
//! use strata_qdiag_engine::{DiagnosticsConfig, DiagnosticsEngine};
//! use strata_qdiag_core::DiagnosticsParams;
//!
//! let engine = DiagnosticsEngine::new(DiagnosticsConfig::default())?;
//! let params = DiagnosticsParams::builder(42).interval_sec(60).build()?;
//! let bundle = engine.activate(params)?;
//! println!("bundle at {}", bundle.output_path());
//! ```

use crate::config::{ConfigError, DiagnosticsConfig};
use crate::status::{StatusReporter, StatusRow};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use strata_qdiag_concurrency::{
    format_execution, ActiveBundleRegistry, AppendOutcome, CompletedBundleLog,
};
use strata_qdiag_core::{BindValue, BundleMetadata, DiagnosticsParams, Error, QueryId, Result};
use strata_qdiag_durability::bundle_path;
use tracing::{info, trace};

/// Shared query diagnostics state
#[derive(Debug)]
pub struct DiagnosticsEngine {
    config: DiagnosticsConfig,
    registry: ActiveBundleRegistry,
    completed: CompletedBundleLog,
    /// Reaper tick in milliseconds; the only setting mutable at runtime
    sweep_interval_ms: AtomicU64,
}

impl DiagnosticsEngine {
    /// Validate `config` and size the registry and completed log from it
    pub fn new(config: DiagnosticsConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let registry =
            ActiveBundleRegistry::new(config.max_active_bundles, config.bind_vars_capacity);
        let completed = CompletedBundleLog::with_capacity(config.completed_log_capacity());
        let sweep_interval_ms = AtomicU64::new(config.bg_worker_interval_ms);

        Ok(Self {
            config,
            registry,
            completed,
            sweep_interval_ms,
        })
    }

    /// Configuration the engine was built from
    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// Check the feature gate
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Active bundles
    pub fn registry(&self) -> &ActiveBundleRegistry {
        &self.registry
    }

    /// Retired bundles
    pub fn completed_log(&self) -> &CompletedBundleLog {
        &self.completed
    }

    /// Current reaper tick
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.load(Ordering::Relaxed))
    }

    /// Change the reaper tick. Takes effect after the current wait.
    pub fn set_sweep_interval(&self, interval: Duration) -> std::result::Result<(), ConfigError> {
        let millis = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        if millis == 0 {
            return Err(ConfigError::Invalid(
                "bg_worker_interval_ms must be greater than 0".to_string(),
            ));
        }
        self.sweep_interval_ms.store(millis, Ordering::Relaxed);
        info!(interval_ms = millis, "Query diagnostics reaper interval changed");
        Ok(())
    }

    /// Start a bundle for `params`, starting now.
    pub fn activate(&self, params: DiagnosticsParams) -> Result<BundleMetadata> {
        self.activate_at(params, Utc::now())
    }

    /// Start a bundle for `params` with an explicit start time.
    ///
    /// # Errors
    ///
    /// - [`Error::NotEnabled`] if the feature gate is off
    /// - [`Error::PathConstruction`] if the bundle path is too long
    /// - [`Error::DuplicateBundle`] if the query already has a bundle
    /// - [`Error::Capacity`] if the registry is full
    ///
    /// Nothing is created on the filesystem here; directories appear only
    /// when the bundle is retired with data.
    pub fn activate_at(
        &self,
        params: DiagnosticsParams,
        start_time: DateTime<Utc>,
    ) -> Result<BundleMetadata> {
        if !self.is_enabled() {
            return Err(Error::NotEnabled);
        }

        let path = bundle_path(&self.config.data_root, params.query_id(), start_time)?;
        let metadata = BundleMetadata::new(params, start_time, path);
        self.registry.activate(metadata.clone())?;

        info!(
            query_id = %metadata.query_id(),
            interval_sec = metadata.params().interval_sec(),
            path = %metadata.output_path(),
            "Started query diagnostics bundle"
        );
        Ok(metadata)
    }

    /// Record the end of one query execution.
    ///
    /// Returns `None` when nothing was recorded: the query has no active
    /// bundle, ran faster than the bundle's threshold, or had no bind
    /// parameters. Otherwise returns whether the line was appended or
    /// dropped. Never fails.
    ///
    /// Unmatched ids cost one registry read-lock lookup. Formatting happens
    /// with no lock held.
    pub fn on_execution_end(
        &self,
        query_id: QueryId,
        elapsed: Duration,
        params: &[BindValue],
    ) -> Option<AppendOutcome> {
        let entry = self.registry.find(query_id)?;

        let min_duration_ms = entry.metadata().params().bind_var_min_duration_ms();
        let threshold = Duration::from_millis(u64::try_from(min_duration_ms).unwrap_or(0));
        if elapsed < threshold || params.is_empty() {
            return None;
        }

        if entry.accumulator().is_full() {
            trace!(query_id = %query_id, "Bind variable buffer full, execution dropped");
            return Some(AppendOutcome::Full);
        }

        let line = format_execution(params, elapsed);
        let outcome = entry.append(&line);
        if outcome != AppendOutcome::Appended {
            trace!(
                query_id = %query_id,
                bytes = line.len(),
                ?outcome,
                "Execution not recorded"
            );
        }
        Some(outcome)
    }

    /// Status of every active and retained completed bundle
    ///
    /// # Errors
    ///
    /// [`Error::NotEnabled`] if the feature gate is off.
    pub fn status(&self) -> Result<Vec<StatusRow>> {
        if !self.is_enabled() {
            return Err(Error::NotEnabled);
        }
        Ok(StatusReporter::report(self))
    }
}
