//! Report computation engine.
//!
//! [`diff_items`] classifies every item of the current list against the
//! previous list; [`compute_report`] wraps the result with snapshot meta.

use crate::model::item::{is_canonical, Item};
use crate::model::quantity::Quantity;
use crate::model::report::{
    ChangeEntry, ItemChanges, Report, ReportCounts, ReportMeta, ReportTotals,
};
use crate::model::snapshot::Snapshot;
use std::collections::{HashMap, HashSet};

/// Compute the report for `current` against its predecessor.
///
/// `previous` is `None` for the first snapshot in the chain, in which case
/// every item is reported as new.
pub fn compute_report(current: &Snapshot, previous: Option<&Snapshot>) -> Report {
    let previous_items: &[Item] = previous.map(|p| p.items.as_slice()).unwrap_or(&[]);
    Report {
        meta: ReportMeta {
            snapshot: current.meta.clone(),
            previous: previous.map(|p| p.meta.clone()),
        },
        changes: diff_items(&current.items, previous_items),
    }
}

/// Classify `current` against `previous`.
///
/// - no previous match → `new_items` (`previous_quantity = 0`)
/// - matched with positive delta → `increases`
/// - matched with negative delta → `decreases`
/// - matched with zero delta → counted as `unchanged` only
/// - previous item absent from current → `removed_items` (`quantity = 0`)
///
/// Each list is stable-sorted after classification: new by quantity desc,
/// removed by previous quantity desc, increases by delta desc, decreases by
/// absolute delta desc. Equal keys keep their name order.
pub fn diff_items(current: &[Item], previous: &[Item]) -> ItemChanges {
    debug_assert!(is_canonical(current) && is_canonical(previous));

    let previous_by_name: HashMap<&str, &Item> = previous
        .iter()
        .map(|item| (item.name.as_str(), item))
        .collect();

    let mut new_items = Vec::new();
    let mut increases = Vec::new();
    let mut decreases = Vec::new();
    let mut unchanged = 0usize;

    for item in current {
        match previous_by_name.get(item.name.as_str()) {
            None => new_items.push(ChangeEntry {
                name: item.name.clone(),
                unit: item.unit.clone(),
                previous_quantity: Quantity::ZERO,
                quantity: item.quantity,
                delta: item.quantity,
            }),
            Some(prev) => {
                let delta = item.quantity - prev.quantity;
                let entry = ChangeEntry {
                    name: item.name.clone(),
                    unit: item.unit.clone(),
                    previous_quantity: prev.quantity,
                    quantity: item.quantity,
                    delta,
                };
                if delta.is_positive() {
                    increases.push(entry);
                } else if delta.is_negative() {
                    decreases.push(entry);
                } else {
                    unchanged += 1;
                }
            }
        }
    }

    let current_names: HashSet<&str> = current.iter().map(|item| item.name.as_str()).collect();
    let mut removed_items: Vec<ChangeEntry> = previous
        .iter()
        .filter(|item| !current_names.contains(item.name.as_str()))
        .map(|item| ChangeEntry {
            name: item.name.clone(),
            unit: item.unit.clone(),
            previous_quantity: item.quantity,
            quantity: Quantity::ZERO,
            delta: -item.quantity,
        })
        .collect();

    new_items.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    removed_items.sort_by(|a, b| b.previous_quantity.cmp(&a.previous_quantity));
    increases.sort_by(|a, b| b.delta.cmp(&a.delta));
    decreases.sort_by(|a, b| b.delta.abs().cmp(&a.delta.abs()));

    let current_total: Quantity = current.iter().map(|item| item.quantity).sum();
    let previous_total: Quantity = previous.iter().map(|item| item.quantity).sum();

    ItemChanges {
        totals: ReportTotals {
            items: current.len(),
            quantity: current_total,
            delta_items: current.len() as i64 - previous.len() as i64,
            delta_quantity: current_total - previous_total,
        },
        counts: ReportCounts {
            new_items: new_items.len(),
            removed: removed_items.len(),
            increased: increases.len(),
            decreased: decreases.len(),
            unchanged,
        },
        new_items,
        removed_items,
        increases,
        decreases,
    }
}
