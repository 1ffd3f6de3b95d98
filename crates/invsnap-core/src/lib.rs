//! invsnap core - inventory snapshot identity and diff engine
//!
//! This crate holds the pure, filesystem-free part of the pipeline:
//! - Row ingestion of raw CSV exports into canonical item lists
//! - Filename date parsing
//! - Content hashing and snapshot identity resolution
//! - Item diffing and report computation
//! - Global chain ordering and index derivation
//! - The error and logging facilities shared by every crate

pub mod chain;
pub mod diff;
pub mod errors;
pub mod ingest;
pub mod logging_facility;
pub mod model;
pub mod snapshot;

pub use invsnap_core_types::schema;

// Re-export commonly used types
pub use chain::{build_chain, Chain, ChainLink, SnapshotRecord};
pub use errors::{ExError, ExErrorKind, InvsnapError, Result};
pub use model::{IndexEntry, Item, Quantity, Report, Snapshot, SnapshotMeta};
