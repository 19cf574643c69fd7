//! Expiry Tests
//!
//! Retirement of bundles by explicit passes and by the background reaper,
//! persistence failures, and the completed-log ring.

use crate::common::*;
use std::fs;
use std::time::Instant;

// ============================================================================
// Explicit Passes
// ============================================================================

#[test]
fn bundle_stays_active_until_interval_elapses() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    qd.activate(&record_all(1, 60)).unwrap();

    let summary = qd.run_expiry_pass_at(Utc::now() + ChronoDuration::seconds(30));

    assert_eq!(summary, ReapSummary::default());
    assert_eq!(qd.status().unwrap()[0].status, "In Progress");
}

#[test]
fn only_expired_bundles_are_retired() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    qd.activate(&record_all(1, 1)).unwrap();
    qd.activate(&record_all(2, 3600)).unwrap();

    let summary = qd.run_expiry_pass_at(Utc::now() + ChronoDuration::seconds(60));

    assert_eq!(summary.expired, 1);
    let rows = qd.status().unwrap();
    assert_eq!(row_for(&rows, 1).status, "Success");
    assert_eq!(row_for(&rows, 2).status, "In Progress");
}

#[test]
fn existing_bundle_file_is_replaced() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    let path = qd.activate(&record_all(1, 1)).unwrap();

    fs::create_dir_all(&path).unwrap();
    fs::write(
        std::path::Path::new(&path).join(BIND_VARIABLES_FILE),
        "stale data from an earlier run\n",
    )
    .unwrap();

    qd.on_execution_end(1, Duration::from_millis(1), &[BindValue::Int(5)]);
    expire_all(&qd);

    assert_eq!(read_bundle(&path).unwrap(), "5,1.000000\n");
}

#[test]
fn unwritable_directory_records_error() {
    let temp = TempDir::new().unwrap();
    // A regular file where the diagnostics directory should be
    fs::write(temp.path().join("query-diagnostics"), "blocker").unwrap();
    let qd = manual(&temp);
    qd.activate(&record_all(9, 1)).unwrap();
    qd.on_execution_end(9, Duration::from_millis(1), &[BindValue::Int(1)]);

    let summary = expire_all(&qd);

    assert_eq!(
        summary,
        ReapSummary {
            expired: 1,
            succeeded: 0,
            failed: 1
        }
    );
    let rows = qd.status().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, "Error");
    assert!(rows[0]
        .description
        .starts_with("Failed to create query diagnostics directory"));
    assert!(rows[0].description.len() <= 127);
}

#[test]
fn failure_of_one_bundle_does_not_affect_others() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    let good = qd.activate(&record_all(1, 1)).unwrap();
    let bad = qd.activate(&record_all(2, 1)).unwrap();

    // Occupy the bad bundle's output file name with a directory
    fs::create_dir_all(std::path::Path::new(&bad).join(BIND_VARIABLES_FILE)).unwrap();

    qd.on_execution_end(1, Duration::from_millis(1), &[BindValue::Int(1)]);
    qd.on_execution_end(2, Duration::from_millis(1), &[BindValue::Int(2)]);
    let summary = expire_all(&qd);

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    let rows = qd.status().unwrap();
    assert_eq!(row_for(&rows, 1).status, "Success");
    assert_eq!(row_for(&rows, 2).status, "Error");
    assert!(row_for(&rows, 2).description.starts_with("Failed to open"));
    assert_eq!(read_bundle(&good).unwrap(), "1,1.000000\n");
}

#[test]
fn completed_log_keeps_most_recent_records() {
    let temp = TempDir::new().unwrap();
    // Room for exactly three completed records
    let qd = manual_with(&temp, |b| b.completed_log_budget_bytes(3 * 1216));

    for query_id in 1..=5 {
        qd.activate(&record_all(query_id, 1)).unwrap();
        assert_eq!(expire_all(&qd).expired, 1);
    }

    let ids: Vec<i64> = qd.status().unwrap().iter().map(|row| row.query_id).collect();
    // Slots are reported in storage order after wrapping
    assert_eq!(ids, vec![4, 5, 3]);
}

// ============================================================================
// Background Reaper
// ============================================================================

#[test]
fn background_reaper_retires_expired_bundles() {
    init_tracing();
    let temp = TempDir::new().unwrap();
    let qd = QueryDiagnostics::builder()
        .data_root(temp.path())
        .sweep_interval_ms(20)
        .open()
        .unwrap();
    assert!(qd.is_reaper_running());

    let path = qd.activate(&record_all(42, 1)).unwrap();
    qd.on_execution_end(42, Duration::from_micros(3500), &[BindValue::Int(7)]);

    let deadline = Instant::now() + Duration::from_secs(10);
    while qd.status().unwrap()[0].status == "In Progress" && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }

    assert_eq!(qd.status().unwrap()[0].status, "Success");
    assert_eq!(read_bundle(&path).unwrap(), "7,3.500000\n");
    qd.close().unwrap();
}

#[test]
fn close_stops_reaper_and_keeps_active_bundles() {
    let temp = TempDir::new().unwrap();
    let qd = QueryDiagnostics::builder()
        .data_root(temp.path())
        .sweep_interval_ms(10)
        .open()
        .unwrap();
    qd.activate(&record_all(1, 3600)).unwrap();

    qd.close().unwrap();
    assert!(!qd.is_reaper_running());
    // Second close is harmless
    qd.close().unwrap();

    assert_eq!(qd.status().unwrap()[0].status, "In Progress");
    // Manual passes still work
    assert_eq!(expire_all(&qd).expired, 1);
}

#[test]
fn reaper_not_started_when_disabled() {
    let temp = TempDir::new().unwrap();
    let qd = QueryDiagnostics::builder()
        .data_root(temp.path())
        .enabled(false)
        .open()
        .unwrap();

    assert!(!qd.is_reaper_running());
}

#[test]
fn sweep_interval_can_change_at_runtime() {
    let temp = TempDir::new().unwrap();
    let qd = QueryDiagnostics::builder()
        .data_root(temp.path())
        .sweep_interval_ms(5000)
        .open()
        .unwrap();
    assert_eq!(qd.sweep_interval(), Duration::from_secs(5));

    qd.set_sweep_interval(Duration::from_millis(10)).unwrap();
    assert_eq!(qd.sweep_interval(), Duration::from_millis(10));

    let err = qd.set_sweep_interval(Duration::ZERO).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    qd.close().unwrap();
}

#[test]
fn invalid_configuration_rejected_at_open() {
    let temp = TempDir::new().unwrap();

    let err = QueryDiagnostics::builder()
        .data_root(temp.path())
        .sweep_interval_ms(0)
        .open()
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let err = QueryDiagnostics::builder()
        .data_root(temp.path())
        .bind_vars_capacity(1)
        .open()
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn configuration_from_toml() {
    let temp = TempDir::new().unwrap();
    let text = format!(
        "data_root = {:?}\nmax_active_bundles = 1\nbg_worker_interval_ms = 50\n",
        temp.path().to_str().unwrap()
    );
    let config = DiagnosticsConfig::from_toml_str(&text).unwrap();

    let qd = QueryDiagnostics::builder()
        .config(config)
        .without_reaper()
        .open()
        .unwrap();

    assert_eq!(qd.data_root(), temp.path());
    qd.activate(&ActivationRequest::new(1)).unwrap();
    assert!(qd.activate(&ActivationRequest::new(2)).unwrap_err().is_capacity());
}
