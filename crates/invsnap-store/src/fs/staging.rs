//! Staged directory replacement.
//!
//! A rebuild writes its complete artifact set into a sibling staging
//! directory (`.<name>.staging-<run>`), then swaps it into place:
//!
//! 1. the live directory is renamed to `.<name>.previous-<run>`
//! 2. the staging directory is renamed to the live name
//! 3. the previous directory is removed
//!
//! If step 2 fails the previous directory is renamed back. A crash between
//! steps 1 and 2 leaves no live directory but an intact previous one, which
//! [`recover`] restores on the next run.

#![allow(clippy::result_large_err)]

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{io_error_at, swap_error, Result};

const STAGING_MARKER: &str = ".staging-";
const PREVIOUS_MARKER: &str = ".previous-";

/// Leftovers handled by [`recover`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Abandoned staging directories that were deleted
    pub removed_staging: Vec<PathBuf>,
    /// Previous directories that were deleted after a completed swap
    pub removed_previous: Vec<PathBuf>,
    /// Previous directory renamed back because the live one was missing
    pub restored: Option<PathBuf>,
}

impl RecoveryReport {
    pub fn is_clean(&self) -> bool {
        self.removed_staging.is_empty() && self.removed_previous.is_empty() && self.restored.is_none()
    }
}

/// A staging directory that replaces `target` on commit.
#[derive(Debug)]
pub struct StagingArea {
    target: PathBuf,
    staging: PathBuf,
    previous: PathBuf,
}

impl StagingArea {
    /// Create a fresh, empty staging directory next to `target`.
    ///
    /// `tag` disambiguates concurrent or leftover areas (a run id).
    pub fn begin(target: &Path, tag: &str) -> Result<Self> {
        let parent = parent_dir(target);
        fs::create_dir_all(&parent).map_err(|e| io_error_at("create_data_parent", &parent, e))?;

        let staging = sibling(target, STAGING_MARKER, tag);
        let previous = sibling(target, PREVIOUS_MARKER, tag);
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| io_error_at("clear_staging", &staging, e))?;
        }
        fs::create_dir(&staging).map_err(|e| io_error_at("create_staging", &staging, e))?;

        tracing::debug!(staging = %staging.display(), "Created staging directory");

        Ok(Self {
            target: target.to_path_buf(),
            staging,
            previous,
        })
    }

    /// Directory to write the new artifact set into.
    pub fn path(&self) -> &Path {
        &self.staging
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Swap the staged directory into place.
    ///
    /// # Errors
    ///
    /// `Persistence` when either rename fails; the live directory is left as
    /// it was before the call.
    pub fn commit(self) -> Result<()> {
        let had_live = self.target.exists();
        if had_live {
            fs::rename(&self.target, &self.previous).map_err(|e| {
                swap_error(&self.target, io_error_at("move_live_aside", &self.target, e))
            })?;
        }

        if let Err(e) = fs::rename(&self.staging, &self.target) {
            let err = swap_error(&self.target, io_error_at("promote_staging", &self.staging, e));
            if had_live {
                if let Err(restore) = fs::rename(&self.previous, &self.target) {
                    tracing::error!(
                        previous = %self.previous.display(),
                        error = %restore,
                        "Failed to restore previous data directory"
                    );
                }
            }
            return Err(err);
        }

        if had_live {
            if let Err(e) = fs::remove_dir_all(&self.previous) {
                // The swap already succeeded; recover() cleans this up later
                tracing::warn!(
                    previous = %self.previous.display(),
                    error = %e,
                    "Failed to remove previous data directory"
                );
            }
        }

        tracing::debug!(target = %self.target.display(), "Committed staging directory");
        Ok(())
    }

    /// Discard the staged directory without touching the live one.
    pub fn abort(self) -> Result<()> {
        fs::remove_dir_all(&self.staging).map_err(|e| io_error_at("abort_staging", &self.staging, e))
    }
}

/// Clean up after a crashed run.
///
/// Removes abandoned staging directories. A previous directory is restored
/// when the live directory is missing, otherwise deleted.
pub fn recover(target: &Path) -> Result<RecoveryReport> {
    let mut report = RecoveryReport::default();
    let parent = parent_dir(target);
    let Some(name) = target.file_name() else {
        return Ok(report);
    };
    if !parent.is_dir() {
        return Ok(report);
    }

    let staging_prefix = marker_prefix(name, STAGING_MARKER);
    let previous_prefix = marker_prefix(name, PREVIOUS_MARKER);

    let mut previous_dirs = Vec::new();
    let entries = fs::read_dir(&parent).map_err(|e| io_error_at("scan_data_parent", &parent, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_error_at("scan_data_parent", &parent, e))?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if file_name.starts_with(&staging_prefix) {
            let path = entry.path();
            fs::remove_dir_all(&path).map_err(|e| io_error_at("remove_stale_staging", &path, e))?;
            report.removed_staging.push(path);
        } else if file_name.starts_with(&previous_prefix) {
            previous_dirs.push(entry.path());
        }
    }
    report.removed_staging.sort();
    previous_dirs.sort();

    for path in previous_dirs {
        if report.restored.is_none() && !target.exists() {
            fs::rename(&path, target).map_err(|e| io_error_at("restore_previous", &path, e))?;
            report.restored = Some(path);
        } else {
            fs::remove_dir_all(&path).map_err(|e| io_error_at("remove_stale_previous", &path, e))?;
            report.removed_previous.push(path);
        }
    }

    if !report.is_clean() {
        tracing::warn!(
            removed_staging = report.removed_staging.len(),
            removed_previous = report.removed_previous.len(),
            restored = report.restored.is_some(),
            "Recovered leftovers from an interrupted rebuild"
        );
    }

    Ok(report)
}

fn parent_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn marker_prefix(name: &std::ffi::OsStr, marker: &str) -> String {
    format!(".{}{}", name.to_string_lossy(), marker)
}

fn sibling(target: &Path, marker: &str, tag: &str) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("data"));
    let mut sibling_name = OsString::from(".");
    sibling_name.push(&name);
    sibling_name.push(marker);
    sibling_name.push(tag);
    parent_dir(target).join(sibling_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_commit_replaces_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("data");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("stale.json"), "old").unwrap();

        let staging = StagingArea::begin(&target, "run1").unwrap();
        fs::write(staging.path().join("index.json"), "[]\n").unwrap();
        staging.commit().unwrap();

        assert!(target.join("index.json").exists());
        assert!(!target.join("stale.json").exists());
        let leftovers = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_commit_without_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("nested").join("data");

        let staging = StagingArea::begin(&target, "run1").unwrap();
        fs::write(staging.path().join("index.json"), "[]\n").unwrap();
        staging.commit().unwrap();

        assert!(target.join("index.json").exists());
    }

    #[test]
    fn test_abort_leaves_live_directory() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("data");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("index.json"), "old").unwrap();

        let staging = StagingArea::begin(&target, "run1").unwrap();
        fs::write(staging.path().join("index.json"), "new").unwrap();
        staging.abort().unwrap();

        assert_eq!(fs::read_to_string(target.join("index.json")).unwrap(), "old");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_recover_restores_previous_when_live_missing() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("data");
        let previous = temp_dir.path().join(".data.previous-crashed");
        fs::create_dir(&previous).unwrap();
        fs::write(previous.join("index.json"), "old").unwrap();
        fs::create_dir(temp_dir.path().join(".data.staging-crashed")).unwrap();

        let report = recover(&target).unwrap();

        assert_eq!(report.restored, Some(previous));
        assert_eq!(report.removed_staging.len(), 1);
        assert_eq!(fs::read_to_string(target.join("index.json")).unwrap(), "old");
    }

    #[test]
    fn test_recover_removes_previous_when_live_present() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("data");
        fs::create_dir(&target).unwrap();
        fs::create_dir(temp_dir.path().join(".data.previous-done")).unwrap();

        let report = recover(&target).unwrap();

        assert!(report.restored.is_none());
        assert_eq!(report.removed_previous.len(), 1);
        assert!(target.exists());
    }

    #[test]
    fn test_recover_ignores_unrelated_siblings() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("data");
        fs::create_dir(temp_dir.path().join(".other.staging-x")).unwrap();

        let report = recover(&target).unwrap();

        assert!(report.is_clean());
        assert!(temp_dir.path().join(".other.staging-x").exists());
    }
}
