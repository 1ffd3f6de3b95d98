//! Logging macros for rebuild events
//!
//! `op` boundaries use [`log_op_start!`], [`log_op_end!`] and
//! [`log_op_error!`]; the state machine and the row ingestor report through
//! [`log_phase!`] and [`log_issue!`].

/// Log the start of an operation with its inputs.
///
/// ```
/// # use invsnap_core::log_op_start;
/// log_op_start!("rebuild", input_dir = "raw", data_dir = "public/data");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
            $($($field)*)?
        );
    };
}

/// Log the successful end of an operation.
///
/// ```
/// # use invsnap_core::log_op_end;
/// log_op_end!("rebuild", duration_ms = 42, snapshot_count = 3, reused = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        );
    };
}

/// Log a failed operation. `$err` is anything convertible into `ExError`.
///
/// ```
/// # use invsnap_core::{log_op_error, errors::InvsnapError};
/// let err = InvsnapError::FilenamePattern { file_name: "stock.csv".to_string() };
/// log_op_error!("rebuild", err, duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_message = ex_err.message(),
            $($($field)*)?
        );
    }};
}

/// Log a rebuild phase transition.
///
/// ```
/// # use invsnap_core::log_phase;
/// log_phase!("Parsing");
/// ```
#[macro_export]
macro_rules! log_phase {
    ($phase:expr) => {
        tracing::info!(
            component = module_path!(),
            event = $crate::schema::EVENT_PHASE,
            phase = $phase,
            "Entering phase"
        );
    };
}

/// Log a skipped input row.
///
/// ```
/// # use invsnap_core::log_issue;
/// # use invsnap_core::ingest::ingest_str;
/// let result = ingest_str("stock_03152024.csv", "name,unit,qty\nA,kg,1\nA,kg,2\n").unwrap();
/// log_issue!("stock_03152024.csv", &result.issues[0]);
/// ```
#[macro_export]
macro_rules! log_issue {
    ($source_file:expr, $issue:expr) => {{
        let source_file = $source_file;
        let issue: &$crate::ingest::IngestIssue = $issue;
        tracing::warn!(
            component = module_path!(),
            event = $crate::schema::EVENT_ISSUE,
            source_file = %source_file,
            line = issue.line,
            issue_kind = ?issue.kind,
            err_code = issue.kind.error_kind().code(),
            "{}",
            issue.message
        );
    }};
}
