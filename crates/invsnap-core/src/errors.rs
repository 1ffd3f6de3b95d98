use invsnap_core_types::RunId;
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and exit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    /// Input filename does not carry a valid MMDDYYYY date
    FilenamePattern,
    /// An input file could not be parsed into at least one item
    ParseError,

    // Non-fatal ingestion issues (reported, never returned as Err by the pipeline)
    RowSkipped,
    DuplicateNameSkipped,

    // Identity resolution
    /// A prior index entry points at a snapshot body that cannot be read
    MissingPriorArtifact,

    // Chain
    /// Two snapshots would occupy the same storage path or order slot
    DeterminismViolation,

    // Integration/IO
    Config,
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::FilenamePattern => "ERR_FILENAME_PATTERN",
            ExErrorKind::ParseError => "ERR_PARSE",
            ExErrorKind::RowSkipped => "ERR_ROW_SKIPPED",
            ExErrorKind::DuplicateNameSkipped => "ERR_DUPLICATE_NAME_SKIPPED",
            ExErrorKind::MissingPriorArtifact => "ERR_MISSING_PRIOR_ARTIFACT",
            ExErrorKind::DeterminismViolation => "ERR_DETERMINISM_VIOLATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether an error of this kind aborts a rebuild
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ExErrorKind::RowSkipped
                | ExErrorKind::DuplicateNameSkipped
                | ExErrorKind::MissingPriorArtifact
        )
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and rich context
/// for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (source file, storage filename, path)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ========== Domain Errors ==========

/// Component-level failures raised by the ingest, identity, and chain layers
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvsnapError {
    #[error("Filename {file_name} does not contain an 8-digit MMDDYYYY date")]
    FilenamePattern { file_name: String },

    #[error("Filename {file_name} encodes {digits}, which is not a calendar date")]
    InvalidCalendarDate { file_name: String, digits: String },

    #[error("Header of {source_file} is missing a {column} column")]
    MissingColumn { source_file: String, column: String },

    #[error("Header of {source_file} could not be read: {reason}")]
    MalformedHeader { source_file: String, reason: String },

    #[error("No valid rows in {source_file} ({issue_count} rows skipped)")]
    NoValidRows {
        source_file: String,
        issue_count: usize,
    },

    #[error("Modification time of {source_file} is outside the supported range")]
    TimestampOutOfRange { source_file: String },

    #[error("Snapshots {first} and {second} resolve to the same storage filename {storage_filename}")]
    DuplicateStoragePath {
        storage_filename: String,
        first: String,
        second: String,
    },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<InvsnapError> for ExError {
    fn from(err: InvsnapError) -> Self {
        let message = err.to_string();
        match err {
            InvsnapError::FilenamePattern { file_name } => {
                ExError::new(ExErrorKind::FilenamePattern)
                    .with_op("parse_snapshot_date")
                    .with_entity_id(file_name)
                    .with_message(message)
            }

            InvsnapError::InvalidCalendarDate { file_name, .. } => {
                ExError::new(ExErrorKind::FilenamePattern)
                    .with_op("parse_snapshot_date")
                    .with_entity_id(file_name)
                    .with_message(message)
            }

            InvsnapError::MissingColumn { source_file, .. }
            | InvsnapError::MalformedHeader { source_file, .. }
            | InvsnapError::NoValidRows { source_file, .. } => ExError::new(ExErrorKind::ParseError)
                .with_op("ingest")
                .with_entity_id(source_file)
                .with_message(message),

            InvsnapError::TimestampOutOfRange { source_file } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("resolve_identity")
                    .with_entity_id(source_file)
                    .with_message(message)
            }

            InvsnapError::DuplicateStoragePath {
                storage_filename, ..
            } => ExError::new(ExErrorKind::DeterminismViolation)
                .with_op("build_chain")
                .with_entity_id(storage_filename)
                .with_message(message),

            InvsnapError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            InvsnapError::Internal { .. } => ExError::new(ExErrorKind::Internal).with_message(message),
        }
    }
}

/// Conversion from serde_json::Error to InvsnapError
impl From<serde_json::Error> for InvsnapError {
    fn from(err: serde_json::Error) -> Self {
        InvsnapError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from serde_json::Error to ExError
impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        InvsnapError::from(err).into()
    }
}
