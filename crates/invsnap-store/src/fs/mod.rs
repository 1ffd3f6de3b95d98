//! Filesystem primitives
//!
//! Provides:
//! - Atomic temp→rename file writes with pretty JSON rendering
//! - The data directory layout
//! - Staging directories swapped into place on commit

mod atomic;
mod layout;
mod staging;

pub use atomic::{atomic_write, to_json_bytes, write_json};
pub use layout::ArtifactLayout;
pub use staging::{recover, RecoveryReport, StagingArea};
