//! Oblige Pipeline
//!
//! The extraction-and-persistence pipeline: upload a document, extract the
//! obligations it places on a company, persist them under a key derived from
//! the source key, and read them back later.
//!
//! # Example Usage
//!
//! ```no_run
//! use oblige_extractor::{ExtractorConfig, LopdfExtractor};
//! use oblige_llm::MockCompleter;
//! use oblige_pipeline::{Pipeline, PipelineConfig};
//! use oblige_store::MemoryBlobStore;
//! use std::sync::Arc;
//!
//! # async fn example(pdf: Vec<u8>) -> Result<(), oblige_pipeline::PipelineError> {
//! let pipeline = Pipeline::new(
//!     Arc::new(MemoryBlobStore::new()),
//!     Arc::new(LopdfExtractor),
//!     Arc::new(MockCompleter::new("- File annual reports")),
//!     ExtractorConfig::default(),
//!     PipelineConfig::default(),
//! );
//!
//! let key = pipeline.upload_source("act.pdf", pdf, "application/pdf").await?;
//! let extracted = pipeline.extract_and_persist("Company X", &key).await?;
//! assert_eq!(pipeline.fetch_output(&key).await?, extracted.obligations);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod orchestrator;
mod types;

pub use error::PipelineError;
pub use orchestrator::Pipeline;
pub use types::{
    Discovered, Extracted, PersistedOutput, PipelineConfig, ProfileRecord, StepOutcome,
    DEFAULT_MAX_PRESIGN_TTL_SECS, DEFAULT_PRESIGN_TTL_SECS,
};
