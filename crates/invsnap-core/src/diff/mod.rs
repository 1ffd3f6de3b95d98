//! Snapshot diff engine.
//!
//! Compares one snapshot's item list with its chronological predecessor's
//! and produces a structured, deterministic [`Report`](crate::model::Report).
//!
//! ## Entry point
//!
//! ```ignore
//! use invsnap_core::diff::engine::compute_report;
//!
//! let report = compute_report(&current, Some(&previous));
//! let summary = invsnap_core::diff::human_summary::render_report_summary(&report);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce byte-identical report output.
//! - **Partition**: `new + increased + decreased + unchanged == |current|` and
//!   `removed == |previous \ current|`.
//! - **Exactness**: all arithmetic is fixed-point; no rounding drift.

pub mod engine;
pub mod human_summary;

pub use engine::{compute_report, diff_items};
pub use human_summary::render_report_summary;
