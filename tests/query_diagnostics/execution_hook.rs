//! Execution Hook Tests
//!
//! What an execution contributes to its bundle, as seen in the written
//! file after retirement.

use crate::common::*;

#[test]
fn matching_execution_is_written() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    let path = qd.activate(&record_all(42, 1)).unwrap();

    let outcome = qd.on_execution_end(42, Duration::from_micros(3500), &[BindValue::Int(7)]);
    assert_eq!(outcome, Some(AppendOutcome::Appended));

    let summary = expire_all(&qd);
    assert_eq!(summary.succeeded, 1);

    assert_eq!(read_bundle(&path).unwrap(), "7,3.500000\n");
    let rows = qd.status().unwrap();
    assert_eq!(rows[0].status, "Success");
    assert_eq!(rows[0].description, "");
}

#[test]
fn executions_below_threshold_capture_nothing() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    let path = qd
        .activate(&ActivationRequest::new(42).interval_sec(1).bind_var_min_duration_ms(10))
        .unwrap();

    for _ in 0..5 {
        let outcome = qd.on_execution_end(42, Duration::from_millis(9), &[BindValue::Int(7)]);
        assert_eq!(outcome, None);
    }
    expire_all(&qd);

    let rows = qd.status().unwrap();
    assert_eq!(rows[0].status, "Success");
    assert_eq!(rows[0].description, "No data captured");
    assert!(read_bundle(&path).is_none());
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn threshold_is_inclusive() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    let path = qd
        .activate(&ActivationRequest::new(3).interval_sec(1).bind_var_min_duration_ms(10))
        .unwrap();

    qd.on_execution_end(3, Duration::from_millis(10), &[BindValue::Int(1)]);
    expire_all(&qd);

    assert_eq!(read_bundle(&path).unwrap(), "1,10.000000\n");
}

#[test]
fn other_queries_are_ignored() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    let path = qd.activate(&record_all(42, 1)).unwrap();

    assert_eq!(
        qd.on_execution_end(43, Duration::from_secs(1), &[BindValue::Int(1)]),
        None
    );
    expire_all(&qd);

    assert!(read_bundle(&path).is_none());
}

#[test]
fn executions_without_parameters_are_ignored() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    qd.activate(&record_all(8, 1)).unwrap();

    assert_eq!(qd.on_execution_end(8, Duration::from_secs(1), &[]), None);
    expire_all(&qd);

    assert_eq!(qd.status().unwrap()[0].description, "No data captured");
}

#[test]
fn every_value_kind_is_rendered() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    let path = qd.activate(&record_all(11, 1)).unwrap();

    let params = [
        BindValue::Null,
        BindValue::Bool(true),
        BindValue::Bool(false),
        BindValue::Int(-12),
        BindValue::Float(1.5),
        BindValue::Text("abc".into()),
        BindValue::Bytes(vec![0xde, 0xad]),
    ];
    qd.on_execution_end(11, Duration::from_millis(2), &params);
    expire_all(&qd);

    assert_eq!(
        read_bundle(&path).unwrap(),
        "NULL,t,f,-12,1.5,abc,\\xdead,2.000000\n"
    );
}

#[test]
fn executions_are_appended_in_order() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    let path = qd.activate(&record_all(9, 1)).unwrap();

    for i in 1..=3 {
        qd.on_execution_end(9, Duration::from_millis(i as u64), &[BindValue::Int(i)]);
    }
    expire_all(&qd);

    assert_eq!(
        read_bundle(&path).unwrap(),
        "1,1.000000\n2,2.000000\n3,3.000000\n"
    );
}

#[test]
fn full_buffer_drops_whole_lines() {
    let temp = TempDir::new().unwrap();
    // "1,1.000000\n" is 11 bytes; two lines fit under 32
    let qd = manual_with(&temp, |b| b.bind_vars_capacity(32));
    let path = qd.activate(&record_all(4, 1)).unwrap();

    let values = [BindValue::Int(1)];
    let elapsed = Duration::from_millis(1);
    let outcomes: Vec<_> = (0..4)
        .map(|_| qd.on_execution_end(4, elapsed, &values))
        .collect();

    assert_eq!(
        outcomes,
        vec![
            Some(AppendOutcome::Appended),
            Some(AppendOutcome::Appended),
            Some(AppendOutcome::Full),
            Some(AppendOutcome::Full),
        ]
    );

    expire_all(&qd);

    let written = read_bundle(&path).unwrap();
    assert_eq!(written, "1,1.000000\n1,1.000000\n");
    assert!(written.len() < 32);
}

#[test]
fn executions_after_retirement_are_ignored() {
    let temp = TempDir::new().unwrap();
    let qd = manual(&temp);
    let path = qd.activate(&record_all(6, 1)).unwrap();
    qd.on_execution_end(6, Duration::from_millis(1), &[BindValue::Int(1)]);
    expire_all(&qd);

    assert_eq!(
        qd.on_execution_end(6, Duration::from_millis(1), &[BindValue::Int(2)]),
        None
    );
    assert_eq!(read_bundle(&path).unwrap(), "1,1.000000\n");
}
