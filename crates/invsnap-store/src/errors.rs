//! Error handling for invsnap-store
//!
//! Wraps invsnap-core ExError with store-specific helpers

use std::path::Path;

use invsnap_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error naming the path involved
pub fn io_error_at(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    io_error(operation, err).with_entity_id(path.display().to_string())
}

/// Create a serialization error for a persisted artifact
pub fn serialization_error(operation: &str, path: &Path, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_entity_id(path.display().to_string())
        .with_message(err.to_string())
}

/// Create a missing prior artifact warning
pub fn missing_prior_artifact(path: &Path, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::MissingPriorArtifact)
        .with_op("load_prior")
        .with_entity_id(path.display().to_string())
        .with_message(reason)
}

/// Create a staging swap failure
pub fn swap_error(target: &Path, source: ExError) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("commit_staging")
        .with_entity_id(target.display().to_string())
        .with_message("failed to swap staged artifacts into place")
        .with_source(source)
}
