use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::item::Item;
use super::quantity::Quantity;

/// Identity and provenance of one snapshot.
///
/// `uploaded_at` is kept as the exact string that was persisted so that a
/// reused identity is written back byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    pub snapshot_date: NaiveDate,
    pub uploaded_at: String,
    pub source_file: String,
}

impl SnapshotMeta {
    /// Global chronological sort key.
    pub fn chronological_key(&self) -> (NaiveDate, &str) {
        (self.snapshot_date, self.uploaded_at.as_str())
    }
}

/// An immutable point-in-time item list tied to one source upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub meta: SnapshotMeta,
    pub items: Vec<Item>,
}

impl Snapshot {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> Quantity {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Canonical timestamp text: RFC 3339, UTC, millisecond precision, `Z`.
///
/// Fixed width, so lexical order equals chronological order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
