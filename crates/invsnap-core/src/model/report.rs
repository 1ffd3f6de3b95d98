use serde::{Deserialize, Serialize};

use super::quantity::Quantity;
use super::snapshot::SnapshotMeta;

/// One row of a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEntry {
    pub name: String,
    pub unit: String,
    pub previous_quantity: Quantity,
    pub quantity: Quantity,
    pub delta: Quantity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub items: usize,
    pub quantity: Quantity,
    pub delta_items: i64,
    pub delta_quantity: Quantity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCounts {
    #[serde(rename = "new")]
    pub new_items: usize,
    pub removed: usize,
    pub increased: usize,
    pub decreased: usize,
    pub unchanged: usize,
}

impl ReportCounts {
    /// Items of the current side accounted for by the counts.
    pub fn current_total(&self) -> usize {
        self.new_items + self.increased + self.decreased + self.unchanged
    }
}

/// The classified difference between two item lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemChanges {
    pub totals: ReportTotals,
    pub counts: ReportCounts,
    pub new_items: Vec<ChangeEntry>,
    pub removed_items: Vec<ChangeEntry>,
    pub increases: Vec<ChangeEntry>,
    pub decreases: Vec<ChangeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    #[serde(flatten)]
    pub snapshot: SnapshotMeta,
    /// Meta of the chronological predecessor, `null` for the first snapshot.
    pub previous: Option<SnapshotMeta>,
}

/// Changes between one snapshot and its chronological predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    #[serde(flatten)]
    pub changes: ItemChanges,
}
