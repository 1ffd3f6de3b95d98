//! invsnap engine - orchestration layer
//!
//! Provides high-level commands that coordinate between core domain logic
//! and the persistence layer, plus the layered rebuild configuration.

pub mod commands;
pub mod config;

pub use commands::{rebuild, RebuildOutcome};
pub use config::{ConfigOverrides, LogFormat, RebuildConfig};
