//! Full rebuild orchestration.
//!
//! ## Phases (in order)
//!
//! 1. `ScanningExisting`: recover from an interrupted run, load prior identities
//! 2. `Parsing`: validate every filename date, ingest each file, resolve identities
//! 3. `Diffing`: build the global chain and its reports
//! 4. `Writing`: write the artifact set to staging and swap it into place
//!
//! A fatal error before `Writing` leaves the data directory untouched.

#![allow(clippy::result_large_err)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use invsnap_core::chain::{build_chain, SnapshotRecord};
use invsnap_core::diff::render_report_summary;
use invsnap_core::errors::{ExError, InvsnapError, Result};
use invsnap_core::ingest::{ingest_reader, parse_snapshot_date, IngestIssue};
use invsnap_core::model::{IndexEntry, Snapshot, SnapshotMeta};
use invsnap_core::snapshot::{compute_content_hash, IdentityResolver};
use invsnap_core::{log_issue, log_op_end, log_op_error, log_op_start, log_phase};
use invsnap_core_types::{RunContext, RunId};
use invsnap_store::artifacts::{load_prior, write_artifacts};
use invsnap_store::errors::io_error_at;
use invsnap_store::fs::{recover, RecoveryReport, StagingArea};

use crate::config::RebuildConfig;

/// Rebuild state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RebuildPhase {
    Idle,
    ScanningExisting,
    Parsing,
    Diffing,
    Writing,
    Done,
}

impl RebuildPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RebuildPhase::Idle => "Idle",
            RebuildPhase::ScanningExisting => "ScanningExisting",
            RebuildPhase::Parsing => "Parsing",
            RebuildPhase::Diffing => "Diffing",
            RebuildPhase::Writing => "Writing",
            RebuildPhase::Done => "Done",
        }
    }
}

struct PhaseTracker {
    phase: RebuildPhase,
}

impl PhaseTracker {
    fn new() -> Self {
        Self {
            phase: RebuildPhase::Idle,
        }
    }

    /// Phases only move forward
    fn enter(&mut self, next: RebuildPhase) -> Result<()> {
        if next <= self.phase {
            return Err(InvsnapError::Internal {
                message: format!(
                    "rebuild phase cannot move from {} to {}",
                    self.phase.as_str(),
                    next.as_str()
                ),
            }
            .into());
        }
        self.phase = next;
        log_phase!(next.as_str());
        Ok(())
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub source_file: String,
    pub snapshot_date: NaiveDate,
    pub storage_filename: String,
    pub uploaded_at: String,
    /// True when a prior identity was reused
    pub reused: bool,
    pub item_count: usize,
    pub issues: Vec<IngestIssue>,
}

/// Summary of a completed rebuild.
#[derive(Debug, Clone)]
pub struct RebuildOutcome {
    pub run_id: RunId,
    /// Per-file results in input file name order
    pub files: Vec<FileOutcome>,
    /// Index rows in global order
    pub index: Vec<IndexEntry>,
    /// Index row of the current snapshot
    pub current: Option<IndexEntry>,
    /// Unusable prior artifacts, treated as cache misses
    pub prior_warnings: Vec<ExError>,
    /// Prior identities no input file matched
    pub unmatched_prior: usize,
    pub recovery: RecoveryReport,
}

impl RebuildOutcome {
    pub fn snapshot_count(&self) -> usize {
        self.index.len()
    }

    pub fn reused_count(&self) -> usize {
        self.files.iter().filter(|f| f.reused).count()
    }

    pub fn minted_count(&self) -> usize {
        self.files.iter().filter(|f| !f.reused).count()
    }

    pub fn issue_count(&self) -> usize {
        self.files.iter().map(|f| f.issues.len()).sum()
    }
}

/// Run a full rebuild with a fresh run id.
///
/// # Errors
///
/// - `FilenamePattern` when an input name carries no valid date
/// - `ParseError` when an input file yields no items
/// - `Io` / `Persistence` when reading inputs or publishing artifacts fails
pub fn rebuild(config: &RebuildConfig) -> Result<RebuildOutcome> {
    rebuild_with_context(config, &RunContext::new())
}

/// Run a full rebuild under an existing run context.
///
/// # Errors
///
/// See [`rebuild`].
pub fn rebuild_with_context(config: &RebuildConfig, ctx: &RunContext) -> Result<RebuildOutcome> {
    let span = tracing::info_span!("rebuild", run_id = %ctx.run_id);
    let _guard = span.enter();

    let started = Instant::now();
    log_op_start!(
        "rebuild",
        input_dir = %config.input_dir.display(),
        data_dir = %config.data_dir.display()
    );

    match run(config, ctx) {
        Ok(outcome) => {
            log_op_end!(
                "rebuild",
                duration_ms = started.elapsed().as_millis() as u64,
                snapshot_count = outcome.snapshot_count(),
                reused = outcome.reused_count(),
                minted = outcome.minted_count(),
                issue_count = outcome.issue_count()
            );
            Ok(outcome)
        }
        Err(err) => {
            let err = err.with_run_id(ctx.run_id.clone());
            log_op_error!(
                "rebuild",
                err.clone(),
                duration_ms = started.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}

fn run(config: &RebuildConfig, ctx: &RunContext) -> Result<RebuildOutcome> {
    let mut phases = PhaseTracker::new();

    phases.enter(RebuildPhase::ScanningExisting)?;
    let recovery = recover(&config.data_dir)?;
    let prior = load_prior(&config.data_dir);
    let mut resolver = IdentityResolver::new(prior.identities);

    phases.enter(RebuildPhase::Parsing)?;
    let inputs = list_inputs(&config.input_dir)?;
    let dated = inputs
        .into_iter()
        .map(|input| {
            let date = parse_snapshot_date(&input.file_name)?;
            Ok((input, date))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut files = Vec::with_capacity(dated.len());
    let mut records = Vec::with_capacity(dated.len());
    for (input, snapshot_date) in dated {
        let (file, record) = ingest_file(&input, snapshot_date, &mut resolver)?;
        files.push(file);
        records.push(record);
    }
    let unmatched_prior = resolver.unmatched_count();

    phases.enter(RebuildPhase::Diffing)?;
    let chain = build_chain(records)?;

    phases.enter(RebuildPhase::Writing)?;
    let staging = StagingArea::begin(&config.data_dir, ctx.run_id.short())?;
    if let Err(err) = write_artifacts(staging.path(), &chain) {
        if let Err(abort) = staging.abort() {
            tracing::warn!(error = %abort, "Failed to discard staging directory");
        }
        return Err(err);
    }
    staging.commit()?;

    phases.enter(RebuildPhase::Done)?;
    if let Some(current) = chain.current_link() {
        tracing::debug!(
            summary = %render_report_summary(&current.report),
            "Current report"
        );
    }

    let current = chain.current.and_then(|i| chain.index.get(i)).cloned();
    Ok(RebuildOutcome {
        run_id: ctx.run_id.clone(),
        files,
        index: chain.index,
        current,
        prior_warnings: prior.warnings,
        unmatched_prior,
        recovery,
    })
}

struct InputFile {
    path: PathBuf,
    file_name: String,
}

/// Regular `.csv` files (any case) directly inside `dir`, sorted by name.
fn list_inputs(dir: &Path) -> Result<Vec<InputFile>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        let message = format!("cannot read input directory {}: {}", dir.display(), e);
        io_error_at("list_inputs", dir, e).with_message(message)
    })?;

    let mut inputs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_error_at("list_inputs", dir, e))?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv || !path.is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %path.display(), "Skipping input with non UTF-8 name");
            continue;
        };
        inputs.push(InputFile { path, file_name });
    }

    inputs.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    tracing::debug!(file_count = inputs.len(), "Listed input files");
    Ok(inputs)
}

fn ingest_file(
    input: &InputFile,
    snapshot_date: NaiveDate,
    resolver: &mut IdentityResolver,
) -> Result<(FileOutcome, SnapshotRecord)> {
    let file = fs::File::open(&input.path).map_err(|e| io_error_at("open_input", &input.path, e))?;
    let modified = file
        .metadata()
        .and_then(|m| m.modified())
        .map_err(|e| io_error_at("stat_input", &input.path, e))?;
    let modified_at = system_time_to_utc(modified).ok_or_else(|| {
        ExError::from(InvsnapError::TimestampOutOfRange {
            source_file: input.file_name.clone(),
        })
    })?;

    let ingested = ingest_reader(&input.file_name, std::io::BufReader::new(file))?;
    for issue in &ingested.issues {
        log_issue!(&input.file_name, issue);
    }

    let content_hash = compute_content_hash(&ingested.items)?;
    let identity = resolver.resolve(&input.file_name, snapshot_date, &content_hash, modified_at);

    tracing::info!(
        source_file = %input.file_name,
        snapshot_date = %snapshot_date,
        storage_filename = %identity.storage_filename,
        content_hash = %content_hash,
        item_count = ingested.items.len(),
        issue_count = ingested.issues.len(),
        reused = identity.reused,
        "Resolved snapshot"
    );

    let outcome = FileOutcome {
        source_file: input.file_name.clone(),
        snapshot_date,
        storage_filename: identity.storage_filename.clone(),
        uploaded_at: identity.uploaded_at.clone(),
        reused: identity.reused,
        item_count: ingested.items.len(),
        issues: ingested.issues,
    };
    let record = SnapshotRecord {
        snapshot: Snapshot {
            meta: SnapshotMeta {
                snapshot_date,
                uploaded_at: identity.uploaded_at,
                source_file: input.file_name.clone(),
            },
            items: ingested.items,
        },
        storage_filename: identity.storage_filename,
    };
    Ok((outcome, record))
}

fn system_time_to_utc(time: SystemTime) -> Option<DateTime<Utc>> {
    let epoch = Utc.timestamp_opt(0, 0).single()?;
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => epoch.checked_add_signed(Duration::from_std(after).ok()?),
        Err(before) => epoch.checked_sub_signed(Duration::from_std(before.duration()).ok()?),
    }
}
