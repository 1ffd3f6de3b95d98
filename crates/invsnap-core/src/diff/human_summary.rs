//! Human-readable summary renderer for snapshot reports.

use crate::model::report::{ChangeEntry, Report};

/// Maximum rows listed per section before the remainder is elided.
const SECTION_LIMIT: usize = 10;

/// Render a Markdown summary of a [`Report`].
///
/// Informational only; the structured report is the source of truth.
pub fn render_report_summary(report: &Report) -> String {
    let mut out = String::new();
    let meta = &report.meta.snapshot;
    let changes = &report.changes;

    out.push_str(&format!("## Inventory Report: {}\n\n", meta.snapshot_date));
    out.push_str(&format!(
        "**Source**: `{}`  \n**Uploaded**: {}\n",
        meta.source_file, meta.uploaded_at
    ));
    match &report.meta.previous {
        Some(previous) => out.push_str(&format!(
            "**Compared with**: `{}` ({})\n\n",
            previous.source_file, previous.uploaded_at
        )),
        None => out.push_str("**Compared with**: _nothing (first snapshot)_\n\n"),
    }

    out.push_str("### Totals\n\n");
    out.push_str(&format!(
        "| | Items | Quantity |\n\
         |---|---|---|\n\
         | Current | {} | {} |\n\
         | Change | {} | {} |\n\n",
        changes.totals.items,
        changes.totals.quantity,
        signed(changes.totals.delta_items),
        signed_quantity(changes.totals.delta_quantity),
    ));

    let counts = &changes.counts;
    out.push_str(&format!(
        "- New: {}\n- Removed: {}\n- Increased: {}\n- Decreased: {}\n- Unchanged: {}\n\n",
        counts.new_items, counts.removed, counts.increased, counts.decreased, counts.unchanged
    ));

    if counts.new_items + counts.removed + counts.increased + counts.decreased == 0 {
        out.push_str("_No quantity changes._\n");
        return out;
    }

    section(&mut out, "New Items", &changes.new_items, |e| {
        format!("{} {}", e.quantity, e.unit)
    });
    section(&mut out, "Removed Items", &changes.removed_items, |e| {
        format!("was {} {}", e.previous_quantity, e.unit)
    });
    section(&mut out, "Increases", &changes.increases, |e| {
        format!(
            "{} → {} {} ({})",
            e.previous_quantity,
            e.quantity,
            e.unit,
            signed_quantity(e.delta)
        )
    });
    section(&mut out, "Decreases", &changes.decreases, |e| {
        format!(
            "{} → {} {} ({})",
            e.previous_quantity,
            e.quantity,
            e.unit,
            signed_quantity(e.delta)
        )
    });

    out
}

fn section<F>(out: &mut String, title: &str, entries: &[ChangeEntry], describe: F)
where
    F: Fn(&ChangeEntry) -> String,
{
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("### {} ({})\n\n", title, entries.len()));
    for entry in entries.iter().take(SECTION_LIMIT) {
        out.push_str(&format!("- **{}**: {}\n", entry.name, describe(entry)));
    }
    if entries.len() > SECTION_LIMIT {
        out.push_str(&format!("- _…and {} more_\n", entries.len() - SECTION_LIMIT));
    }
    out.push('\n');
}

fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

fn signed_quantity(value: crate::model::Quantity) -> String {
    if value.is_positive() {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::engine::compute_report;
    use crate::model::{Item, Quantity, Snapshot, SnapshotMeta};
    use chrono::NaiveDate;

    fn snapshot(items: Vec<Item>) -> Snapshot {
        Snapshot {
            meta: SnapshotMeta {
                snapshot_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                uploaded_at: "2024-03-15T10:00:00.000Z".to_string(),
                source_file: "stock_03152024.csv".to_string(),
            },
            items,
        }
    }

    #[test]
    fn test_first_snapshot_lists_new_items() {
        let current = snapshot(vec![Item::new("Bolts", "box", Quantity::from_units(3))]);
        let summary = render_report_summary(&compute_report(&current, None));
        assert!(summary.contains("first snapshot"));
        assert!(summary.contains("### New Items (1)"));
        assert!(summary.contains("**Bolts**: 3 box"));
    }

    #[test]
    fn test_unchanged_report_short_circuits() {
        let current = snapshot(vec![Item::new("Bolts", "box", Quantity::from_units(3))]);
        let summary = render_report_summary(&compute_report(&current, Some(&current)));
        assert!(summary.contains("_No quantity changes._"));
        assert!(!summary.contains("### Increases"));
    }

    #[test]
    fn test_long_sections_are_elided() {
        let items: Vec<Item> = (0..12)
            .map(|i| Item::new(format!("Item {i:02}"), "ea", Quantity::from_units(1)))
            .collect();
        let summary = render_report_summary(&compute_report(&snapshot(items), None));
        assert!(summary.contains("…and 2 more"));
    }
}
