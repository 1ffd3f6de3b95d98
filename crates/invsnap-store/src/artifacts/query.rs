//! Read-side access to a persisted data directory.

#![allow(clippy::result_large_err)]

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;

use invsnap_core::errors::ExError;
use invsnap_core::model::{IndexEntry, Report, Snapshot};
use invsnap_core::snapshot::{compute_content_hash, PriorIdentity};

use crate::errors::{io_error_at, missing_prior_artifact, serialization_error, Result};
use crate::fs::ArtifactLayout;

/// Identities recovered from a previous rebuild.
#[derive(Debug, Clone, Default)]
pub struct PriorState {
    pub identities: Vec<PriorIdentity>,
    /// `MissingPriorArtifact` warnings for unusable entries
    pub warnings: Vec<ExError>,
}

/// Load prior identities from the index and snapshot bodies under `root`.
///
/// Never fails: a missing index means there is no history, and an unreadable
/// index or snapshot body is reported as a warning and skipped.
pub fn load_prior(root: &Path) -> PriorState {
    let layout = ArtifactLayout::new(root);
    let mut state = PriorState::default();

    let index = match load_index(root) {
        Ok(Some(index)) => index,
        Ok(None) => return state,
        Err(e) => {
            let warning = missing_prior_artifact(&layout.index(), "prior index is unreadable")
                .with_source(e);
            tracing::warn!(err_code = warning.code(), error = %warning, "Ignoring prior index");
            state.warnings.push(warning);
            return state;
        }
    };

    for entry in index {
        match load_prior_identity(&layout, &entry) {
            Ok(identity) => state.identities.push(identity),
            Err(warning) => {
                tracing::warn!(
                    err_code = warning.code(),
                    storage_filename = entry.storage_filename(),
                    error = %warning,
                    "Prior snapshot body unusable; treating as cache miss"
                );
                state.warnings.push(warning);
            }
        }
    }

    tracing::debug!(
        identity_count = state.identities.len(),
        warning_count = state.warnings.len(),
        "Loaded prior identities"
    );

    state
}

fn load_prior_identity(layout: &ArtifactLayout, entry: &IndexEntry) -> Result<PriorIdentity> {
    let path = layout.resolve(&entry.path);
    let snapshot: Snapshot = match read_json(&path) {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => return Err(missing_prior_artifact(&path, "snapshot body is missing")),
        Err(e) => {
            return Err(missing_prior_artifact(&path, "snapshot body is unreadable").with_source(e))
        }
    };

    let content_hash = compute_content_hash(&snapshot.items)
        .map_err(|e| missing_prior_artifact(&path, "snapshot body cannot be hashed").with_source(e))?;

    // The index row is authoritative for identity; the body supplies content
    Ok(PriorIdentity {
        source_file: entry.meta.source_file.clone(),
        snapshot_date: entry.meta.snapshot_date,
        content_hash,
        uploaded_at: entry.meta.uploaded_at.clone(),
        storage_filename: entry.storage_filename().to_string(),
    })
}

/// Load `index.json`; `None` when it does not exist.
///
/// ## Errors
///
/// - `ExErrorKind::Io`: the file exists but cannot be read
/// - `ExErrorKind::Serialization`: the file is not a valid index
pub fn load_index(root: &Path) -> Result<Option<Vec<IndexEntry>>> {
    read_json(&ArtifactLayout::new(root).index())
}

/// Load `current/report.json`; `None` when missing or `null`.
///
/// ## Errors
///
/// As [`load_index`].
pub fn load_current_report(root: &Path) -> Result<Option<Report>> {
    Ok(read_json::<Option<Report>>(&ArtifactLayout::new(root).current_report())?.flatten())
}

/// Load `current/snapshot.json`; `None` when missing or `null`.
///
/// ## Errors
///
/// As [`load_index`].
pub fn load_current_snapshot(root: &Path) -> Result<Option<Snapshot>> {
    Ok(read_json::<Option<Snapshot>>(&ArtifactLayout::new(root).current_snapshot())?.flatten())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error_at("read_artifact", path, e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| serialization_error("parse_artifact", path, e))
}
