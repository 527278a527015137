use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Reasons a model response is rejected before anything is written.
///
/// The validator fails closed: every variant aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedResponse {
    #[error("output does not contain an opening frontmatter delimiter")]
    NoFrontmatterStart,

    #[error("no closing frontmatter delimiter found")]
    NoFrontmatterEnd,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("commentary seems too short ({length} characters, minimum {minimum})")]
    CommentaryTooShort { length: usize, minimum: usize },

    #[error("passage is empty")]
    EmptyPassage,

    #[error("frontmatter is not valid YAML: {0}")]
    InvalidYaml(String),

    #[error("field '{field}' has an invalid value: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("passageLink is not a well-formed http(s) URL: {0:?}")]
    InvalidPassageLink(String),

    #[error("passageLink is only allowed when excerpt is true")]
    PassageLinkWithoutExcerpt,

    #[error("entry is dated {found} but was requested for {expected}")]
    DateMismatch {
        expected: NaiveDate,
        found: NaiveDate,
    },
}

impl MalformedResponse {
    /// Stable reason code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            MalformedResponse::NoFrontmatterStart => "NO_FRONTMATTER_START",
            MalformedResponse::NoFrontmatterEnd => "NO_FRONTMATTER_END",
            MalformedResponse::MissingField(_) => "MISSING_FIELD",
            MalformedResponse::CommentaryTooShort { .. } => "COMMENTARY_TOO_SHORT",
            MalformedResponse::EmptyPassage => "EMPTY_PASSAGE",
            MalformedResponse::InvalidYaml(_) => "INVALID_YAML",
            MalformedResponse::InvalidField { .. } => "INVALID_FIELD",
            MalformedResponse::InvalidPassageLink(_) => "INVALID_PASSAGE_LINK",
            MalformedResponse::PassageLinkWithoutExcerpt => "PASSAGE_LINK_WITHOUT_EXCERPT",
            MalformedResponse::DateMismatch { .. } => "DATE_MISMATCH",
        }
    }
}

/// Pipeline-level error type. Every variant is fatal for the current run;
/// nothing is retried automatically.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("External generation call failed: {0}")]
    ExternalCall(#[from] LlmError),

    #[error("Malformed response [{}]: {reason}", reason.code())]
    MalformedResponse {
        reason: MalformedResponse,
        raw_prefix: String,
        cleaned_prefix: String,
    },

    #[error("Duplicate passage: already used by the entry for {original_entry_date} ({passage_hash})")]
    DuplicatePassage {
        original_entry_date: NaiveDate,
        passage_hash: String,
    },

    #[error("File system error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Registry at {} could not be (de)serialized: {source}", path.display())]
    Registry {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::FileSystem {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::ExternalCall(_) => "EXTERNAL_CALL_FAILURE",
            PipelineError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            PipelineError::DuplicatePassage { .. } => "DUPLICATE_PASSAGE",
            PipelineError::FileSystem { .. } => "FILE_SYSTEM_ERROR",
            PipelineError::Registry { .. } => "REGISTRY_ERROR",
            PipelineError::Config(_) => "CONFIG_ERROR",
        }
    }
}
