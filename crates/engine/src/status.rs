//! Status reporting
//!
//! One row per active bundle followed by one row per retained completed
//! bundle. Active rows come from a registry snapshot, completed rows from a
//! completed-log snapshot; the two snapshots are taken one after the other
//! and never under a common lock.

use crate::engine::DiagnosticsEngine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use strata_qdiag_core::{BundleMetadata, BundleStatus, Description, DiagnosticsParams};

/// One row of the status view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRow {
    /// "Success", "In Progress" or "Error"
    pub status: String,
    /// Outcome text; empty for active bundles
    pub description: String,
    /// Query the bundle captures
    pub query_id: i64,
    /// Activation time
    pub start_time: DateTime<Utc>,
    /// Capture interval in seconds
    pub interval_sec: i64,
    /// Minimum execution time recorded, in milliseconds
    pub bind_var_min_duration_ms: i64,
    /// Explain settings as a JSON object
    pub params: serde_json::Value,
    /// Bundle directory
    pub path: String,
}

impl StatusRow {
    fn new(metadata: &BundleMetadata, status: BundleStatus, description: &Description) -> Self {
        let params = metadata.params();
        StatusRow {
            status: status.label().to_string(),
            description: description.as_str().to_string(),
            query_id: metadata.query_id().as_i64(),
            start_time: metadata.start_time(),
            interval_sec: params.interval_sec(),
            bind_var_min_duration_ms: params.bind_var_min_duration_ms(),
            params: explain_params(params),
            path: metadata.output_path().to_string(),
        }
    }
}

/// Builds status rows from an engine's collections
pub struct StatusReporter;

impl StatusReporter {
    /// Active rows first, then completed rows in log storage order
    pub fn report(engine: &DiagnosticsEngine) -> Vec<StatusRow> {
        let active = engine.registry().snapshot_all();
        let completed = engine.completed_log().snapshot();

        let in_progress = Description::empty();
        let mut rows = Vec::with_capacity(active.len() + completed.len());
        rows.extend(
            active
                .iter()
                .map(|metadata| StatusRow::new(metadata, BundleStatus::InProgress, &in_progress)),
        );
        rows.extend(completed.iter().map(|record| {
            StatusRow::new(&record.metadata, record.status.into(), &record.description)
        }));
        rows
    }
}

fn explain_params(params: &DiagnosticsParams) -> serde_json::Value {
    json!({
        "explain_sample_rate": params.explain_sample_rate(),
        "explain_analyze": params.explain_analyze(),
        "explain_dist": params.explain_dist(),
        "explain_debug": params.explain_debug(),
    })
}
