#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::item;
use invsnap_core::ingest::ingest_str;
use invsnap_core::snapshot::compute_content_hash;

#[test]
fn test_hash_is_independent_of_input_order() {
    let forward = vec![item("A", "kg", "1"), item("B", "kg", "2")];
    let reverse = vec![item("B", "kg", "2"), item("A", "kg", "1")];

    assert_eq!(
        compute_content_hash(&forward).unwrap(),
        compute_content_hash(&reverse).unwrap()
    );
}

#[test]
fn test_hash_is_sha256_hex() {
    let hash = compute_content_hash(&[item("A", "kg", "1")]).unwrap();
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_hash_changes_with_quantity_or_unit() {
    let base = compute_content_hash(&[item("A", "kg", "1")]).unwrap();
    let quantity = compute_content_hash(&[item("A", "kg", "2")]).unwrap();
    let unit = compute_content_hash(&[item("A", "lb", "1")]).unwrap();

    assert_ne!(base, quantity);
    assert_ne!(base, unit);
}

#[test]
fn test_hash_ignores_representation_noise() {
    let a = ingest_str("a.csv", "name,unit,quantity\nA,kg,13.92\nB,kg,1000\n").unwrap();
    let b = ingest_str(
        "a.csv",
        "Qty,Product,UOM\n\"1,000\",B,kg\n13.9199999,A,kg\n",
    )
    .unwrap();

    assert_eq!(
        compute_content_hash(&a.items).unwrap(),
        compute_content_hash(&b.items).unwrap()
    );
}
