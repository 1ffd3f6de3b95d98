//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate between
//! core domain logic and persistence layer.

pub mod rebuild;
pub mod summary;

pub use rebuild::{rebuild, rebuild_with_context, FileOutcome, RebuildOutcome, RebuildPhase};
pub use summary::current_summary;
