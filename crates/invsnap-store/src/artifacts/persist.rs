//! Artifact persistence.
//!
//! Writes one chain's complete artifact set beneath a data root. The root is
//! normally a staging directory; see [`crate::fs::StagingArea`].

#![allow(clippy::result_large_err)]

use std::path::Path;

use invsnap_core::chain::Chain;

use crate::errors::Result;
use crate::fs::{write_json, ArtifactLayout};

/// Counts of files written by [`write_artifacts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub snapshots: usize,
    pub reports: usize,
}

/// Write snapshots, reports, the index and the current pointers under `root`.
///
/// With an empty chain the index is `[]` and both current files hold `null`.
///
/// ## Errors
///
/// - `ExErrorKind::Io`: a directory or file could not be written
/// - `ExErrorKind::Serialization`: JSON serialization failed
pub fn write_artifacts(root: &Path, chain: &Chain) -> Result<WriteStats> {
    let layout = ArtifactLayout::new(root);
    let mut stats = WriteStats::default();

    for (link, entry) in chain.links.iter().zip(&chain.index) {
        write_json(&layout.resolve(&entry.path), &link.record.snapshot)?;
        stats.snapshots += 1;
        write_json(&layout.resolve(&entry.report_path), &link.report)?;
        stats.reports += 1;
    }

    write_json(&layout.index(), &chain.index)?;

    let current = chain.current_link();
    write_json(
        &layout.current_snapshot(),
        &current.map(|link| &link.record.snapshot),
    )?;
    write_json(&layout.current_report(), &current.map(|link| &link.report))?;

    tracing::debug!(
        root = %root.display(),
        snapshot_count = stats.snapshots,
        report_count = stats.reports,
        "Wrote artifact set"
    );

    Ok(stats)
}
