use chrono::NaiveDate;
use invsnap_core::chain::SnapshotRecord;
use invsnap_core::model::{Item, Quantity, Snapshot, SnapshotMeta};
use invsnap_core::snapshot::storage_filename_for;

/// Build an item from a decimal quantity literal
#[allow(dead_code)]
pub fn item(name: &str, unit: &str, quantity: &str) -> Item {
    Item::new(name, unit, Quantity::parse(quantity).unwrap())
}

/// Parse a `YYYY-MM-DD` date
#[allow(dead_code)]
pub fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

/// Build a snapshot with items in canonical order
#[allow(dead_code)]
pub fn snapshot(source_file: &str, snapshot_date: &str, uploaded_at: &str, mut items: Vec<Item>) -> Snapshot {
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Snapshot {
        meta: SnapshotMeta {
            snapshot_date: date(snapshot_date),
            uploaded_at: uploaded_at.to_string(),
            source_file: source_file.to_string(),
        },
        items,
    }
}

/// Wrap a snapshot into a chain record with its derived storage filename
#[allow(dead_code)]
pub fn record(snapshot: Snapshot) -> SnapshotRecord {
    let storage_filename =
        storage_filename_for(snapshot.meta.snapshot_date, &snapshot.meta.uploaded_at);
    SnapshotRecord {
        snapshot,
        storage_filename,
    }
}
