//! Error types for the pipeline

use oblige_domain::{BlobError, KeyError};
use oblige_extractor::ExtractorError;
use thiserror::Error;

/// Errors surfaced by pipeline operations
///
/// Every variant names the stage that failed via [`PipelineError::stage`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The supplied key or filename cannot be used
    #[error("{0}")]
    MalformedKey(#[from] KeyError),

    /// The requested object does not exist
    #[error("Object not found: {key}")]
    NotFound {
        /// Missing key
        key: String,
    },

    /// The blob store failed
    #[error("Store unavailable during {stage}: {cause}")]
    StoreUnavailable {
        /// Stage that touched the store
        stage: &'static str,
        /// Underlying cause
        cause: String,
    },

    /// The document produced no text
    #[error("PDF text is empty.")]
    EmptyDocumentText,

    /// The page extractor failed
    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),

    /// The completion call failed
    #[error("Completion failed: {0}")]
    CompletionFailed(String),

    /// A primary write failed
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// A requested link lifetime is zero or above the configured maximum
    #[error("Link lifetime must be between 1 and {max} seconds, got {requested}")]
    InvalidTtl {
        /// Requested lifetime
        requested: u64,
        /// Configured maximum
        max: u64,
    },

    /// A persisted output exists but could not be loaded
    #[error("Could not load output: {0}")]
    OutputFetchFailed(String),
}

impl PipelineError {
    /// Stable label for the stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::MalformedKey(_) => "key",
            PipelineError::NotFound { .. } => "fetch",
            PipelineError::StoreUnavailable { stage, .. } => stage,
            PipelineError::EmptyDocumentText | PipelineError::ExtractionFailed(_) => "extract_text",
            PipelineError::CompletionFailed(_) => "completion",
            PipelineError::UploadFailed(_) => "upload",
            PipelineError::InvalidTtl { .. } => "presign",
            PipelineError::OutputFetchFailed(_) => "output",
        }
    }

    /// Map a store error raised while running `stage`
    pub(crate) fn from_store(stage: &'static str, e: BlobError) -> Self {
        match e {
            BlobError::NotFound(key) => PipelineError::NotFound { key },
            BlobError::InvalidKey(key) => PipelineError::MalformedKey(KeyError::InvalidPath(key)),
            BlobError::Unavailable(cause) => PipelineError::StoreUnavailable { stage, cause },
        }
    }
}

impl From<ExtractorError> for PipelineError {
    fn from(e: ExtractorError) -> Self {
        match e {
            ExtractorError::EmptyDocumentText => PipelineError::EmptyDocumentText,
            ExtractorError::ExtractionFailed(cause) => PipelineError::ExtractionFailed(cause),
            ExtractorError::CompletionFailed(cause) => PipelineError::CompletionFailed(cause),
        }
    }
}
