#![allow(clippy::unwrap_used, clippy::expect_used)]

use invsnap_core::errors::InvsnapError;
use invsnap_core::ingest::ingest_str;
use invsnap_core::logging_facility::test_capture::init_test_capture;
use invsnap_core::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use invsnap_core::{log_issue, log_op_end, log_op_error, log_op_start, log_phase};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let start_events = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START)
    });

    assert!(start_events > 0, "Should have captured at least one start event");
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events();
    let end_events: Vec<_> = events
        .iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = InvsnapError::NoValidRows {
        source_file: "stock_03152024.csv".to_string(),
        issue_count: 4,
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events();
    let error_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event");

    assert_eq!(error_event.field("err_code"), Some("ERR_PARSE"));
    assert!(error_event
        .field("err_message")
        .unwrap()
        .contains("stock_03152024.csv"));
}

#[test]
fn test_boundary_ownership_single_start_end() {
    let capture = init_test_capture();
    let op_name = "test_boundary_ownership_unique_4";

    log_op_start!(op_name, source_file = "a.csv");
    log_op_end!(op_name, duration_ms = 3);

    let starts = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START)
    });
    let ends = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END)
    });

    assert_eq!(starts, 1, "Should have exactly one start event");
    assert_eq!(ends, 1, "Should have exactly one end event");
}

#[test]
fn test_log_macros_with_multiple_fields() {
    let capture = init_test_capture();
    let op_name = "test_log_macros_fields_unique_5";

    log_op_start!(op_name, source_file = "a.csv", item_count = 12);

    let events = capture.events();
    let start_event = events
        .iter()
        .find(|e| e.op.as_deref() == Some(op_name))
        .expect("Should have start event");

    assert_eq!(start_event.field("source_file"), Some("a.csv"));
    assert_eq!(start_event.field("item_count"), Some("12"));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();
    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

#[test]
fn test_events_for_run_isolates_spans() {
    let capture = init_test_capture();

    let span_a = tracing::info_span!("rebuild", run_id = "isolate-run-a");
    span_a.in_scope(|| log_phase!("Parsing"));
    let span_b = tracing::info_span!("rebuild", run_id = "isolate-run-b");
    span_b.in_scope(|| {
        log_phase!("Parsing");
        log_phase!("Diffing");
    });

    assert_eq!(capture.phases_for_run("isolate-run-a"), vec!["Parsing"]);
    assert_eq!(capture.phases_for_run("isolate-run-b"), vec!["Parsing", "Diffing"]);
}

#[test]
fn test_log_issue_carries_row_details() {
    let capture = init_test_capture();
    let result = ingest_str("stock_03152024.csv", "name,unit,quantity\nA,kg,1\nB,kg,lots\n").unwrap();

    let span = tracing::info_span!("rebuild", run_id = "log-issue-run");
    span.in_scope(|| {
        for issue in &result.issues {
            log_issue!("stock_03152024.csv", issue);
        }
    });

    let issues = capture.issues_for_run("log-issue-run");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field("source_file"), Some("stock_03152024.csv"));
    assert_eq!(issues[0].field("line"), Some("3"));
    assert_eq!(issues[0].field("issue_kind"), Some("InvalidQuantity"));
    assert_eq!(issues[0].field("err_code"), Some("ERR_ROW_SKIPPED"));
}
