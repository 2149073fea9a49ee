//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its three
//! collaborators. Infrastructure implementations live in other crates.

use async_trait::async_trait;
use std::fmt;

/// Errors reported by a blob store backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    /// The key does not exist
    NotFound(String),

    /// The key is not a valid object key
    InvalidKey(String),

    /// Transport, permission or backend failure
    Unavailable(String),
}

impl BlobError {
    /// Whether this is the expected missing-key condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlobError::NotFound(_))
    }
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobError::NotFound(key) => write!(f, "object not found: {}", key),
            BlobError::InvalidKey(key) => write!(f, "invalid object key: {}", key),
            BlobError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for BlobError {}

/// Object storage keyed by slash-delimited strings
///
/// Implemented by the infrastructure layer (oblige-store)
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a key, replacing any existing object
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError>;

    /// Fetch the bytes stored under a key
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;

    /// List keys starting with a prefix, sorted; empty when nothing matches
    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError>;

    /// Delete a key; deleting a missing key succeeds
    async fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// Build a time-limited retrieval URL for a key
    async fn presigned_url(&self, key: &str, ttl_secs: u64) -> Result<String, BlobError>;

    /// Content type recorded at write time, if the backend keeps one
    async fn content_type(&self, _key: &str) -> Result<Option<String>, BlobError> {
        Ok(None)
    }
}

/// Failure of the page text extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextError(pub String);

impl fmt::Display for TextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "text extraction failed: {}", self.0)
    }
}

impl std::error::Error for TextError {}

/// Page-wise text extraction from a PDF
///
/// Implemented by the infrastructure layer (oblige-extractor). Extraction is
/// CPU bound, so callers run it on a blocking thread.
pub trait PageExtractor: Send + Sync {
    /// Extract text per page, in page order; an empty string means the page
    /// carried no text
    fn extract_pages(&self, document: &[u8]) -> Result<Vec<String>, TextError>;
}

/// Parameters for a single chat completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,

    /// System instruction
    pub system_prompt: String,

    /// User instruction
    pub user_prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_output_tokens: u32,
}

/// Failure of the completion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionError(pub String);

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "completion failed: {}", self.0)
    }
}

impl std::error::Error for CompletionError {}

/// Trait for language-model completion
///
/// Implemented by the infrastructure layer (oblige-llm)
#[async_trait]
pub trait Completer: Send + Sync {
    /// Run one completion and return the message body
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
