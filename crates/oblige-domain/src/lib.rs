//! Oblige Domain Layer
//!
//! Core vocabulary shared by every other crate: the storage key layout,
//! obligation lists, company profiles, and the traits for the three external
//! collaborators (blob store, page text extractor, completion service).
//!
//! ## Key Concepts
//!
//! - **Source document**: an uploaded PDF stored at `raw/<uuid>_<filename>`
//! - **Obligation list**: ordered, cleaned lines of model output
//! - **Derived output key**: `output/<base>.json`, a pure function of the source key
//! - **Company profile**: an intake record stored under `company_info/`
//!
//! ## Architecture
//!
//! - No I/O in this crate
//! - Trait definitions for all external interactions
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod keys;
pub mod obligation;
pub mod profile;
pub mod traits;

// Re-exports for convenience
pub use keys::{derive_output_key, profile_key_for, source_key_for, KeyError};
pub use obligation::ObligationList;
pub use profile::CompanyProfile;
pub use traits::{
    BlobError, BlobStore, Completer, CompletionError, CompletionRequest, PageExtractor, TextError,
};
