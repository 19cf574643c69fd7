//! Shared helpers for query diagnostics integration tests.

#![allow(dead_code)]

pub use chrono::{Duration as ChronoDuration, Utc};
pub use std::sync::Arc;
pub use std::time::Duration;
pub use strata_qdiag::prelude::*;
pub use tempfile::TempDir;

use std::path::Path;

/// File each bundle writes its bind variables to
pub const BIND_VARIABLES_FILE: &str = "bind_variables.csv";

/// Install a test-friendly subscriber once per process
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Diagnostics rooted in `temp` with no background reaper
pub fn manual(temp: &TempDir) -> QueryDiagnostics {
    manual_with(temp, |b| b)
}

/// Like [`manual`], with extra builder settings
pub fn manual_with(
    temp: &TempDir,
    configure: impl FnOnce(QueryDiagnosticsBuilder) -> QueryDiagnosticsBuilder,
) -> QueryDiagnostics {
    init_tracing();
    configure(
        QueryDiagnostics::builder()
            .data_root(temp.path())
            .without_reaper(),
    )
    .open()
    .expect("open diagnostics")
}

/// Request recording every execution with bind values
pub fn record_all(query_id: i64, interval_sec: i64) -> ActivationRequest {
    ActivationRequest::new(query_id)
        .interval_sec(interval_sec)
        .bind_var_min_duration_ms(0)
}

/// Retire everything currently active
pub fn expire_all(qd: &QueryDiagnostics) -> ReapSummary {
    qd.run_expiry_pass_at(Utc::now() + ChronoDuration::days(1))
}

/// Contents of a bundle's output file, if it was written
pub fn read_bundle(path: &str) -> Option<String> {
    std::fs::read_to_string(Path::new(path).join(BIND_VARIABLES_FILE)).ok()
}

/// Status row for `query_id`
pub fn row_for(rows: &[StatusRow], query_id: i64) -> &StatusRow {
    rows.iter()
        .find(|row| row.query_id == query_id)
        .unwrap_or_else(|| panic!("no status row for query {}", query_id))
}
