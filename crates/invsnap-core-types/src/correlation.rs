//! Correlation types for rebuild tracking
//!
//! Every rebuild carries a `RunId` so that log lines and staging
//! directories from the same run can be tied together.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single rebuild run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generate a new random RunId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Short form used in directory names
    pub fn short(&self) -> &str {
        match self.0.char_indices().rev().nth(7) {
            Some((start, _)) => &self.0[start..],
            None => &self.0,
        }
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through one rebuild
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: RunId,
}

impl RunContext {
    /// Create a new context with a fresh RunId
    pub fn new() -> Self {
        Self { run_id: RunId::new() }
    }

    /// Create a context with an existing RunId
    pub fn with_run_id(run_id: RunId) -> Self {
        Self { run_id }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
