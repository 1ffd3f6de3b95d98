//! Chain & index builder.
//!
//! Orders every snapshot of a run globally by `(snapshotDate, uploadedAt)`
//! (storage filename breaks any remaining tie), diffs each against its
//! immediate predecessor, and derives the index rows, the per-date latest
//! flags and the "current" pointer.

#![allow(clippy::result_large_err)]

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::diff::engine::compute_report;
use crate::errors::{InvsnapError, Result};
use crate::model::index::{report_path, snapshot_path, IndexEntry};
use crate::model::report::Report;
use crate::model::snapshot::Snapshot;

/// A parsed snapshot paired with the storage filename resolved for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub snapshot: Snapshot,
    pub storage_filename: String,
}

/// One position in the global chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    pub record: SnapshotRecord,
    /// Diff against the immediate predecessor in the chain
    pub report: Report,
}

/// The ordered chain with its derived index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    pub links: Vec<ChainLink>,
    /// Index rows, one per link, in chain order
    pub index: Vec<IndexEntry>,
    /// Position of the snapshot with the greatest `uploadedAt`
    pub current: Option<usize>,
}

impl Chain {
    /// The current snapshot and its report, if the chain is non-empty.
    pub fn current_link(&self) -> Option<&ChainLink> {
        self.current.and_then(|i| self.links.get(i))
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Build the global chain from a run's snapshot records.
///
/// # Errors
///
/// `DeterminismViolation` when two records share a storage filename.
pub fn build_chain(mut records: Vec<SnapshotRecord>) -> Result<Chain> {
    records.sort_by(|a, b| {
        a.snapshot
            .meta
            .chronological_key()
            .cmp(&b.snapshot.meta.chronological_key())
            .then_with(|| a.storage_filename.cmp(&b.storage_filename))
    });

    let mut owners: HashMap<&str, &str> = HashMap::new();
    for record in &records {
        if let Some(first) = owners.insert(
            record.storage_filename.as_str(),
            record.snapshot.meta.source_file.as_str(),
        ) {
            return Err(InvsnapError::DuplicateStoragePath {
                storage_filename: record.storage_filename.clone(),
                first: first.to_string(),
                second: record.snapshot.meta.source_file.clone(),
            }
            .into());
        }
    }

    // Records are sorted, so the last one seen per date is the latest.
    let mut latest_by_date: HashMap<NaiveDate, usize> = HashMap::new();
    for (position, record) in records.iter().enumerate() {
        latest_by_date.insert(record.snapshot.meta.snapshot_date, position);
    }

    let mut links: Vec<ChainLink> = Vec::with_capacity(records.len());
    let mut index = Vec::with_capacity(records.len());
    for (position, record) in records.into_iter().enumerate() {
        let previous = links.last().map(|link| &link.record.snapshot);
        let report = compute_report(&record.snapshot, previous);

        index.push(IndexEntry {
            meta: record.snapshot.meta.clone(),
            path: snapshot_path(&record.storage_filename),
            report_path: report_path(&record.storage_filename),
            latest_for_date: latest_by_date.get(&record.snapshot.meta.snapshot_date)
                == Some(&position),
            total_items: record.snapshot.item_count(),
            total_quantity: record.snapshot.total_quantity(),
        });
        links.push(ChainLink { record, report });
    }

    // max_by keeps the last of equal maxima, i.e. the later chain position.
    let current = index
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.meta.uploaded_at.cmp(&b.meta.uploaded_at))
        .map(|(position, _)| position);

    tracing::debug!(
        snapshot_count = links.len(),
        current = ?current,
        "Built snapshot chain"
    );

    Ok(Chain {
        links,
        index,
        current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::model::{Item, Quantity, SnapshotMeta};

    fn record(source: &str, date: (i32, u32, u32), uploaded_at: &str, qty: i64) -> SnapshotRecord {
        let snapshot_date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        SnapshotRecord {
            storage_filename: crate::snapshot::storage_filename_for(snapshot_date, uploaded_at),
            snapshot: Snapshot {
                meta: SnapshotMeta {
                    snapshot_date,
                    uploaded_at: uploaded_at.to_string(),
                    source_file: source.to_string(),
                },
                items: vec![Item::new("A", "kg", Quantity::from_units(qty))],
            },
        }
    }

    #[test]
    fn test_empty_chain_has_no_current() {
        let chain = build_chain(Vec::new()).unwrap();
        assert!(chain.is_empty());
        assert!(chain.current_link().is_none());
    }

    #[test]
    fn test_first_link_diffs_against_nothing() {
        let chain = build_chain(vec![record("a.csv", (2024, 1, 1), "2024-01-01T00:00:00.000Z", 5)])
            .unwrap();
        assert!(chain.links[0].report.meta.previous.is_none());
        assert_eq!(chain.links[0].report.changes.counts.new_items, 1);
        assert!(chain.index[0].latest_for_date);
    }

    #[test]
    fn test_duplicate_storage_filename_is_rejected() {
        let a = record("a.csv", (2024, 1, 1), "2024-01-01T00:00:00.000Z", 5);
        let mut b = record("b.csv", (2024, 1, 1), "2024-01-01T00:00:00.001Z", 6);
        b.storage_filename = a.storage_filename.clone();

        let err = build_chain(vec![a, b]).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::DeterminismViolation);
    }

    #[test]
    fn test_current_is_max_uploaded_at_not_last_date() {
        // Later date uploaded earlier than an older date's re-upload.
        let old_date = record("a.csv", (2024, 1, 1), "2024-03-01T00:00:00.000Z", 1);
        let new_date = record("b.csv", (2024, 2, 1), "2024-02-01T00:00:00.000Z", 2);
        let chain = build_chain(vec![new_date, old_date]).unwrap();

        assert_eq!(chain.index[1].meta.source_file, "b.csv");
        let current = chain.current_link().unwrap();
        assert_eq!(current.record.snapshot.meta.source_file, "a.csv");
    }
}
