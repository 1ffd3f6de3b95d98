//! Persisted artifact set.
//!
//! ## Responsibilities
//!
//! - Write snapshots, reports, the index and current pointers
//! - Recover prior identities from a previous artifact set
//! - Read the current report for display
//!
//! ## Non-Responsibilities
//!
//! - Diffing and ordering (handled by `invsnap-core`)
//! - Orchestration and staging (handled by `invsnap-engine`)

pub mod persist;
pub mod query;

pub use persist::{write_artifacts, WriteStats};
pub use query::{
    load_current_report, load_current_snapshot, load_index, load_prior, PriorState,
};
