//! Row ingestor.
//!
//! Parses one raw CSV export into a canonical, name-sorted item list plus
//! the non-fatal issues met along the way. Rows are never merged: the first
//! occurrence of a name wins and later ones are reported.
//!
//! ## Header
//!
//! Column names are matched case-insensitively after trimming, with `_`
//! treated as a space. Accepted aliases:
//!
//! | column   | aliases                                  |
//! |----------|------------------------------------------|
//! | name     | `name`, `item`, `item name`, `product`   |
//! | unit     | `unit`, `units`, `uom`                   |
//! | quantity | `quantity`, `qty`, `count`, `on hand`    |
//!
//! ## Range
//!
//! A row whose quantity would push the file's sum of magnitudes past
//! [`MAX_TOTAL_MILLI`] is skipped as an invalid quantity, so report totals
//! and deltas never overflow.

#![allow(clippy::result_large_err)]

pub mod filename;

use std::collections::HashSet;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;

use crate::errors::{ExErrorKind, InvsnapError, Result};
use crate::model::item::{sort_canonical, Item};
use crate::model::quantity::{Quantity, MAX_TOTAL_MILLI};

pub use filename::parse_snapshot_date;

const NAME_ALIASES: &[&str] = &["name", "item", "item name", "product"];
const UNIT_ALIASES: &[&str] = &["unit", "units", "uom"];
const QUANTITY_ALIASES: &[&str] = &["quantity", "qty", "count", "on hand"];

/// Why a row was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    MissingName,
    DuplicateName,
    InvalidQuantity,
    MalformedRow,
}

impl IssueKind {
    /// Error taxonomy kind this issue is reported under.
    pub fn error_kind(&self) -> ExErrorKind {
        match self {
            IssueKind::DuplicateName => ExErrorKind::DuplicateNameSkipped,
            _ => ExErrorKind::RowSkipped,
        }
    }
}

/// A skipped row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestIssue {
    /// 1-based line number in the source file
    pub line: u64,
    pub kind: IssueKind,
    /// Item name, when the row had one
    pub name: Option<String>,
    pub message: String,
}

/// Accepted items (canonical order) and skipped-row issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestResult {
    pub items: Vec<Item>,
    pub issues: Vec<IngestIssue>,
}

struct Columns {
    name: usize,
    unit: usize,
    quantity: usize,
}

/// Ingest CSV text from a string.
///
/// # Errors
///
/// See [`ingest_reader`].
pub fn ingest_str(source_file: &str, text: &str) -> Result<IngestResult> {
    ingest_reader(source_file, text.as_bytes())
}

/// Ingest CSV from any reader.
///
/// # Errors
///
/// - `ParseError` when the header cannot be read or lacks a required column
/// - `ParseError` when no row survives validation ("no valid rows")
pub fn ingest_reader<R: Read>(source_file: &str, reader: R) -> Result<IngestResult> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| InvsnapError::MalformedHeader {
            source_file: source_file.to_string(),
            reason: e.to_string(),
        })?
        .clone();
    let columns = resolve_columns(source_file, &headers)?;

    let mut items = Vec::new();
    let mut issues = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut magnitude_total = Quantity::ZERO;

    for (index, result) in reader.records().enumerate() {
        // +2: 1-based, after the header row
        let fallback_line = index as u64 + 2;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(fallback_line);
                issues.push(IngestIssue {
                    line,
                    kind: IssueKind::MalformedRow,
                    name: None,
                    message: e.to_string(),
                });
                continue;
            }
        };
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(fallback_line);

        if record.iter().all(str::is_empty) {
            continue;
        }

        let name = record.get(columns.name).unwrap_or("");
        if name.is_empty() {
            issues.push(IngestIssue {
                line,
                kind: IssueKind::MissingName,
                name: None,
                message: "row has no name".to_string(),
            });
            continue;
        }

        if seen.contains(name) {
            issues.push(IngestIssue {
                line,
                kind: IssueKind::DuplicateName,
                name: Some(name.to_string()),
                message: format!("duplicate name {:?}; first occurrence kept", name),
            });
            continue;
        }

        let raw_quantity = record.get(columns.quantity).unwrap_or("");
        let quantity = match Quantity::parse(raw_quantity) {
            Ok(quantity) => quantity,
            Err(e) => {
                issues.push(IngestIssue {
                    line,
                    kind: IssueKind::InvalidQuantity,
                    name: Some(name.to_string()),
                    message: e.to_string(),
                });
                continue;
            }
        };

        match magnitude_total
            .checked_add(quantity.abs())
            .filter(|total| total.milli() <= MAX_TOTAL_MILLI)
        {
            Some(total) => magnitude_total = total,
            None => {
                issues.push(IngestIssue {
                    line,
                    kind: IssueKind::InvalidQuantity,
                    name: Some(name.to_string()),
                    message: format!("quantity {} pushes the file total out of range", quantity),
                });
                continue;
            }
        }

        let unit = record.get(columns.unit).unwrap_or("");
        seen.insert(name.to_string());
        items.push(Item::new(name, unit, quantity));
    }

    if items.is_empty() {
        return Err(InvsnapError::NoValidRows {
            source_file: source_file.to_string(),
            issue_count: issues.len(),
        }
        .into());
    }

    sort_canonical(&mut items);

    tracing::debug!(
        source_file = source_file,
        item_count = items.len(),
        issue_count = issues.len(),
        "Ingested rows"
    );

    Ok(IngestResult { items, issues })
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_columns(source_file: &str, headers: &StringRecord) -> Result<Columns> {
    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();

    let find = |aliases: &[&str], column: &str| -> Result<usize> {
        normalized
            .iter()
            .position(|h| aliases.contains(&h.as_str()))
            .ok_or_else(|| {
                InvsnapError::MissingColumn {
                    source_file: source_file.to_string(),
                    column: column.to_string(),
                }
                .into()
            })
    };

    Ok(Columns {
        name: find(NAME_ALIASES, "name")?,
        unit: find(UNIT_ALIASES, "unit")?,
        quantity: find(QUANTITY_ALIASES, "quantity")?,
    })
}
