//! Identity resolution for freshly ingested snapshots.
//!
//! The resolver is seeded with every snapshot identity found in the
//! previously persisted index, bucketed by `(sourceFile, snapshotDate)`.
//! Resolving a snapshot either consumes a prior entry with the same content
//! hash (reusing its `uploadedAt` and storage filename verbatim) or mints a
//! new identity from the input file's modification time.
//!
//! ## Uniqueness
//!
//! Every storage filename and `(snapshotDate, uploadedAt)` slot present in
//! the prior index is reserved up front. A minted identity that would land
//! on a reserved or already assigned slot is advanced by one millisecond
//! until it is free, so two snapshots never share a path or an order slot.

use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};
use std::collections::{HashMap, HashSet};

use crate::model::snapshot::format_timestamp;

/// An identity recovered from the prior index and snapshot bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorIdentity {
    pub source_file: String,
    pub snapshot_date: NaiveDate,
    pub content_hash: String,
    pub uploaded_at: String,
    pub storage_filename: String,
}

#[derive(Debug, Clone)]
struct PriorEntry {
    content_hash: String,
    uploaded_at: String,
    storage_filename: String,
}

/// Outcome of resolving one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub uploaded_at: String,
    pub storage_filename: String,
    /// True when a prior identity was reused
    pub reused: bool,
}

type SnapshotKey = (String, NaiveDate);

/// Reuses prior identities by content hash and mints fresh ones otherwise.
#[derive(Debug, Default)]
pub struct IdentityResolver {
    buckets: HashMap<SnapshotKey, Vec<PriorEntry>>,
    reserved_filenames: HashSet<String>,
    reserved_slots: HashSet<(NaiveDate, String)>,
}

impl IdentityResolver {
    /// Seed the resolver with prior identities.
    pub fn new(prior: impl IntoIterator<Item = PriorIdentity>) -> Self {
        let mut resolver = Self::default();
        for identity in prior {
            resolver
                .reserved_filenames
                .insert(identity.storage_filename.clone());
            resolver
                .reserved_slots
                .insert((identity.snapshot_date, identity.uploaded_at.clone()));
            resolver
                .buckets
                .entry((identity.source_file, identity.snapshot_date))
                .or_default()
                .push(PriorEntry {
                    content_hash: identity.content_hash,
                    uploaded_at: identity.uploaded_at,
                    storage_filename: identity.storage_filename,
                });
        }
        resolver
    }

    /// Number of prior identities not yet consumed.
    pub fn unmatched_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Resolve the identity of one snapshot.
    ///
    /// A prior entry with the same key and content hash is consumed and its
    /// identity returned unchanged. Otherwise `modified_at` (truncated to
    /// milliseconds) becomes `uploadedAt` and a storage filename is derived
    /// from it.
    pub fn resolve(
        &mut self,
        source_file: &str,
        snapshot_date: NaiveDate,
        content_hash: &str,
        modified_at: DateTime<Utc>,
    ) -> ResolvedIdentity {
        let key = (source_file.to_string(), snapshot_date);
        if let Some(bucket) = self.buckets.get_mut(&key) {
            if let Some(pos) = bucket.iter().position(|e| e.content_hash == content_hash) {
                let entry = bucket.remove(pos);
                if bucket.is_empty() {
                    self.buckets.remove(&key);
                }
                tracing::debug!(
                    source_file = source_file,
                    storage_filename = %entry.storage_filename,
                    "Reusing prior snapshot identity"
                );
                return ResolvedIdentity {
                    uploaded_at: entry.uploaded_at,
                    storage_filename: entry.storage_filename,
                    reused: true,
                };
            }
        }

        let mut at = modified_at.trunc_subsecs(3);
        loop {
            let uploaded_at = format_timestamp(at);
            let storage_filename = storage_filename_for(snapshot_date, &uploaded_at);
            let slot = (snapshot_date, uploaded_at.clone());
            if !self.reserved_filenames.contains(&storage_filename)
                && !self.reserved_slots.contains(&slot)
            {
                self.reserved_filenames.insert(storage_filename.clone());
                self.reserved_slots.insert(slot);
                tracing::debug!(
                    source_file = source_file,
                    storage_filename = %storage_filename,
                    "Minted new snapshot identity"
                );
                return ResolvedIdentity {
                    uploaded_at,
                    storage_filename,
                    reused: false,
                };
            }
            at += Duration::milliseconds(1);
        }
    }
}

/// Storage filename for a snapshot: `{snapshotDate}_{sanitized uploadedAt}.json`.
pub fn storage_filename_for(snapshot_date: NaiveDate, uploaded_at: &str) -> String {
    format!(
        "{}_{}.json",
        snapshot_date.format("%Y-%m-%d"),
        uploaded_at.replace([':', '.'], "-")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_storage_filename_is_sanitized() {
        assert_eq!(
            storage_filename_for(date(), "2024-03-15T10:22:33.123Z"),
            "2024-03-15_2024-03-15T10-22-33-123Z.json"
        );
    }

    #[test]
    fn test_minted_timestamp_truncates_to_millis() {
        let mut resolver = IdentityResolver::default();
        let mtime = Utc.with_ymd_and_hms(2024, 3, 15, 10, 22, 33).unwrap()
            + Duration::microseconds(123_999);
        let resolved = resolver.resolve("a.csv", date(), "h1", mtime);
        assert_eq!(resolved.uploaded_at, "2024-03-15T10:22:33.123Z");
        assert!(!resolved.reused);
    }

    #[test]
    fn test_unmatched_count_tracks_consumption() {
        let prior = PriorIdentity {
            source_file: "a.csv".to_string(),
            snapshot_date: date(),
            content_hash: "h1".to_string(),
            uploaded_at: "2024-03-15T00:00:00.000Z".to_string(),
            storage_filename: "2024-03-15_x.json".to_string(),
        };
        let mut resolver = IdentityResolver::new(vec![prior]);
        assert_eq!(resolver.unmatched_count(), 1);

        resolver.resolve("a.csv", date(), "h1", Utc::now());
        assert_eq!(resolver.unmatched_count(), 0);
    }
}
