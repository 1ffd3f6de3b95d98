//! On-disk layout of the derived data directory.
//!
//! ```text
//! <root>/
//!   index.json
//!   snapshots/<storageFilename>
//!   reports/<storageFilename>
//!   current/snapshot.json
//!   current/report.json
//! ```

use std::path::{Path, PathBuf};

use invsnap_core::model::{REPORTS_DIR, SNAPSHOTS_DIR};

pub const INDEX_FILE: &str = "index.json";
pub const CURRENT_DIR: &str = "current";
pub const CURRENT_SNAPSHOT_FILE: &str = "snapshot.json";
pub const CURRENT_REPORT_FILE: &str = "report.json";

/// Resolves artifact paths beneath one data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.root.join(SNAPSHOTS_DIR)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join(REPORTS_DIR)
    }

    pub fn current_snapshot(&self) -> PathBuf {
        self.root.join(CURRENT_DIR).join(CURRENT_SNAPSHOT_FILE)
    }

    pub fn current_report(&self) -> PathBuf {
        self.root.join(CURRENT_DIR).join(CURRENT_REPORT_FILE)
    }

    /// Resolve a root-relative path recorded in the index (`snapshots/x.json`).
    pub fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}
