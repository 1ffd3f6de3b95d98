//! Snapshot identity.
//!
//! This module provides content hashing and identity resolution, which
//! together make a rebuild idempotent: unchanged content keeps the
//! timestamp and storage filename it was first given.
//!
//! ## Responsibilities
//!
//! - Compute deterministic content hashes over canonical item lists
//! - Reuse or mint `(uploadedAt, storageFilename)` per snapshot key
//!
//! ## Non-Responsibilities
//!
//! - Loading prior artifacts (handled by `invsnap-store`)
//! - Orchestration (handled by `invsnap-engine`)

pub mod digest;
pub mod identity;

pub use digest::compute_content_hash;
pub use identity::{storage_filename_for, IdentityResolver, PriorIdentity, ResolvedIdentity};
