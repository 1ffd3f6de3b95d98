//! Read-only summary of the published current report.

#![allow(clippy::result_large_err)]

use std::path::Path;

use invsnap_core::diff::render_report_summary;
use invsnap_core::errors::Result;
use invsnap_store::artifacts::load_current_report;

/// Text printed when the data directory holds no snapshots.
pub const NO_SNAPSHOTS: &str = "No snapshots have been published yet.\n";

/// Render the Markdown summary of `current/report.json` under `data_dir`.
///
/// # Errors
///
/// `Io` or `Serialization` when the report exists but cannot be read.
pub fn current_summary(data_dir: &Path) -> Result<String> {
    match load_current_report(data_dir)? {
        Some(report) => Ok(render_report_summary(&report)),
        None => Ok(NO_SNAPSHOTS.to_string()),
    }
}
