#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{item, record, snapshot};
use invsnap_core::chain::build_chain;
use invsnap_core::model::Quantity;

#[test]
fn test_chain_orders_by_date_then_upload() {
    let records = vec![
        record(snapshot("b.csv", "2024-01-02", "2024-01-02T08:00:00.000Z", vec![item("A", "kg", "3")])),
        record(snapshot("a.csv", "2024-01-01", "2024-01-05T08:00:00.000Z", vec![item("A", "kg", "2")])),
        record(snapshot("a.csv", "2024-01-01", "2024-01-01T08:00:00.000Z", vec![item("A", "kg", "1")])),
    ];

    let chain = build_chain(records).unwrap();
    let uploads: Vec<&str> = chain.index.iter().map(|e| e.meta.uploaded_at.as_str()).collect();

    assert_eq!(
        uploads,
        vec![
            "2024-01-01T08:00:00.000Z",
            "2024-01-05T08:00:00.000Z",
            "2024-01-02T08:00:00.000Z",
        ]
    );
}

#[test]
fn test_predecessor_crosses_source_files() {
    let records = vec![
        record(snapshot("a.csv", "2024-01-01", "2024-01-01T08:00:00.000Z", vec![item("A", "kg", "10")])),
        record(snapshot("b.csv", "2024-01-02", "2024-01-02T08:00:00.000Z", vec![item("A", "kg", "12")])),
    ];

    let chain = build_chain(records).unwrap();
    let report = &chain.links[1].report;

    assert_eq!(report.meta.previous.as_ref().unwrap().source_file, "a.csv");
    assert_eq!(report.changes.increases[0].delta, Quantity::from_units(2));
}

#[test]
fn test_exactly_one_latest_per_date() {
    let records = vec![
        record(snapshot("a.csv", "2024-01-01", "2024-01-01T08:00:00.000Z", vec![item("A", "kg", "1")])),
        record(snapshot("b.csv", "2024-01-01", "2024-01-01T09:00:00.000Z", vec![item("A", "kg", "2")])),
        record(snapshot("c.csv", "2024-01-02", "2024-01-02T08:00:00.000Z", vec![item("A", "kg", "3")])),
    ];

    let chain = build_chain(records).unwrap();
    let flags: Vec<(String, bool)> = chain
        .index
        .iter()
        .map(|e| (e.meta.source_file.clone(), e.latest_for_date))
        .collect();

    assert_eq!(
        flags,
        vec![
            ("a.csv".to_string(), false),
            ("b.csv".to_string(), true),
            ("c.csv".to_string(), true),
        ]
    );
}

#[test]
fn test_index_rows_carry_paths_and_totals() {
    let records = vec![record(snapshot(
        "a.csv",
        "2024-01-01",
        "2024-01-01T08:00:00.000Z",
        vec![item("A", "kg", "1.5"), item("B", "kg", "2.25")],
    ))];

    let chain = build_chain(records).unwrap();
    let entry = &chain.index[0];

    assert_eq!(entry.path, "snapshots/2024-01-01_2024-01-01T08-00-00-000Z.json");
    assert_eq!(entry.report_path, "reports/2024-01-01_2024-01-01T08-00-00-000Z.json");
    assert_eq!(entry.total_items, 2);
    assert_eq!(entry.total_quantity, Quantity::from_milli(3_750));
}

#[test]
fn test_chain_is_independent_of_record_order() {
    let make = || {
        vec![
            record(snapshot("a.csv", "2024-01-01", "2024-01-01T08:00:00.000Z", vec![item("A", "kg", "1")])),
            record(snapshot("b.csv", "2024-01-02", "2024-01-02T08:00:00.000Z", vec![item("B", "kg", "2")])),
            record(snapshot("c.csv", "2024-01-03", "2024-01-03T08:00:00.000Z", vec![item("A", "kg", "4")])),
        ]
    };
    let mut reversed = make();
    reversed.reverse();

    assert_eq!(build_chain(make()).unwrap(), build_chain(reversed).unwrap());
}
