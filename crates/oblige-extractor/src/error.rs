//! Error types for the Extractor

use oblige_domain::{CompletionError, TextError};
use thiserror::Error;

/// Errors that can occur during text or obligation extraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// The document produced no text after trimming
    #[error("PDF text is empty")]
    EmptyDocumentText,

    /// The page extractor failed
    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),

    /// The completion call failed or timed out
    #[error("Completion failed: {0}")]
    CompletionFailed(String),
}

impl From<TextError> for ExtractorError {
    fn from(e: TextError) -> Self {
        ExtractorError::ExtractionFailed(e.0)
    }
}

impl From<CompletionError> for ExtractorError {
    fn from(e: CompletionError) -> Self {
        ExtractorError::CompletionFailed(e.0)
    }
}
