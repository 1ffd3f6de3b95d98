use serde::{Deserialize, Serialize};

use super::quantity::Quantity;
use super::snapshot::SnapshotMeta;

/// Directory (relative to the data root) holding snapshot bodies.
pub const SNAPSHOTS_DIR: &str = "snapshots";

/// Directory (relative to the data root) holding reports.
pub const REPORTS_DIR: &str = "reports";

/// One row of the global index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    #[serde(flatten)]
    pub meta: SnapshotMeta,
    /// Snapshot body path relative to the data root
    pub path: String,
    /// Report path relative to the data root
    pub report_path: String,
    pub latest_for_date: bool,
    pub total_items: usize,
    pub total_quantity: Quantity,
}

impl IndexEntry {
    /// Storage filename (the final path component of `path`).
    pub fn storage_filename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

pub fn snapshot_path(storage_filename: &str) -> String {
    format!("{}/{}", SNAPSHOTS_DIR, storage_filename)
}

pub fn report_path(storage_filename: &str) -> String {
    format!("{}/{}", REPORTS_DIR, storage_filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_index_entry_json_shape() {
        let entry = IndexEntry {
            meta: SnapshotMeta {
                snapshot_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                uploaded_at: "2024-03-15T10:22:33.000Z".to_string(),
                source_file: "stock_03152024.csv".to_string(),
            },
            path: snapshot_path("2024-03-15_x.json"),
            report_path: report_path("2024-03-15_x.json"),
            latest_for_date: true,
            total_items: 2,
            total_quantity: Quantity::from_milli(13_920),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["snapshotDate"], "2024-03-15");
        assert_eq!(json["path"], "snapshots/2024-03-15_x.json");
        assert_eq!(json["reportPath"], "reports/2024-03-15_x.json");
        assert_eq!(json["latestForDate"], true);
        assert_eq!(json["totalQuantity"], 13.92);

        let back: IndexEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
        assert_eq!(back.storage_filename(), "2024-03-15_x.json");
    }
}
