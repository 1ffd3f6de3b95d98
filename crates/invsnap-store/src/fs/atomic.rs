//! Atomic write primitives
//!
//! Uses temp→rename pattern to ensure no partial writes

#![allow(clippy::result_large_err)]

use crate::errors::{io_error_at, serialization_error, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Atomically write bytes to a file
///
/// Uses temp file + rename to ensure atomic write
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error_at("create_artifact_dir", parent, e))?;
    }

    // Create temp file in the same directory
    let temp_path = target_path.with_extension("tmp");

    fs::write(&temp_path, content).map_err(|e| io_error_at("write_artifact_temp", &temp_path, e))?;

    fs::rename(&temp_path, target_path)
        .map_err(|e| io_error_at("rename_artifact_temp", target_path, e))?;

    Ok(())
}

/// Render a value as pretty-printed JSON with a trailing newline
pub fn to_json_bytes<T: Serialize + ?Sized>(target_path: &Path, value: &T) -> Result<Vec<u8>> {
    let mut json = serde_json::to_vec_pretty(value)
        .map_err(|e| serialization_error("serialize_artifact", target_path, e))?;
    json.push(b'\n');
    Ok(json)
}

/// Atomically write a value as pretty-printed JSON with a trailing newline
pub fn write_json<T: Serialize + ?Sized>(target_path: &Path, value: &T) -> Result<()> {
    let json = to_json_bytes(target_path, value)?;
    atomic_write(target_path, &json)
}
