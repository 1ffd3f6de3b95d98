//! invsnap store - filesystem persistence for derived inventory artifacts
//!
//! Provides:
//! - Atomic JSON writes and the data directory layout
//! - Staging directories swapped into place, with crash recovery
//! - Writing a chain's artifact set and reading a prior one back

pub mod artifacts;
pub mod errors;
pub mod fs;

// Re-export key types
pub use errors::Result;
