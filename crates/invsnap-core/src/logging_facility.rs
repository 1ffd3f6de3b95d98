//! Structured logging for invsnap
//!
//! Everything a rebuild logs runs inside an `info_span!("rebuild", run_id)`,
//! so every event below carries the run's `run_id`. Event shapes:
//!
//! | `event`     | level | fields                                             |
//! |-------------|-------|----------------------------------------------------|
//! | `start`     | info  | `op`, plus op inputs (`input_dir`, `data_dir`)     |
//! | `end`       | info  | `op`, `duration_ms`, plus counts (`snapshot_count`) |
//! | `end_error` | error | `op`, `duration_ms`, `err_kind`, `err_code`        |
//! | `phase`     | info  | `phase` (`ScanningExisting` … `Done`)              |
//! | `issue`     | warn  | `source_file`, `line`, `issue_kind`, `err_code`    |
//!
//! Output goes to stderr, pretty or JSON depending on the [`Profile`]; see
//! [`init`]. Tests read the same events back through [`test_capture`].

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
