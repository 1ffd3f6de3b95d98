//! Content hash computation for snapshot item lists.
//!
//! The hash is SHA-256 over the compact JSON serialization of the item list
//! in canonical (name-sorted) order. Quantities are already fixed-point, so
//! the serialization of a given item set is unique.
//!
//! ## Determinism Guarantees
//!
//! - Same items in any row order → same digest (items are sorted first)
//! - Any change to a name, unit, or quantity → different digest
//! - Snapshot meta (dates, timestamps, source file) is never hashed

use crate::errors::Result;
use crate::model::item::Item;
use sha2::{Digest, Sha256};

/// Compute the content hash of an item list.
///
/// ## Returns
///
/// Hex-encoded SHA256 digest (64 characters)
///
/// ## Errors
///
/// Returns `Serialization` if JSON serialization fails.
///
/// ## Example
///
/// ```
/// use invsnap_core::model::{Item, Quantity};
/// use invsnap_core::snapshot::digest::compute_content_hash;
///
/// let items = vec![Item::new("A", "kg", Quantity::from_units(10))];
/// let digest = compute_content_hash(&items).unwrap();
/// assert_eq!(digest.len(), 64);
/// ```
pub fn compute_content_hash(items: &[Item]) -> Result<String> {
    let mut canonical: Vec<&Item> = items.iter().collect();
    canonical.sort_by(|a, b| a.name.cmp(&b.name));
    let serialized = serde_json::to_string(&canonical)?;
    Ok(hash_string(&serialized))
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_string_deterministic() {
        let hash1 = hash_string("test");
        let hash2 = hash_string("test");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_hash_string_different_inputs() {
        assert_ne!(hash_string("test1"), hash_string("test2"));
    }
}
