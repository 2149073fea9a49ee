//! Oblige Storage Layer
//!
//! Implements the `BlobStore` trait from `oblige-domain`.
//!
//! # Backends
//!
//! - `FsBlobStore`: one file per object under a bucket directory
//! - `MemoryBlobStore`: process-local map with fault injection for tests
//!
//! Both backends issue presigned links through a shared `UrlSigner`.
//!
//! # Examples
//!
//! ```
//! use oblige_store::MemoryBlobStore;
//! use oblige_domain::BlobStore;
//!
//! # async fn example() -> Result<(), oblige_domain::BlobError> {
//! let store = MemoryBlobStore::new();
//! store.put("raw/abc_act.pdf", b"%PDF".to_vec(), "application/pdf").await?;
//! assert_eq!(store.list("raw/").await?, vec!["raw/abc_act.pdf".to_string()]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod fs;
pub mod memory;
pub mod signer;

use oblige_domain::BlobError;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use signer::{LinkClaims, SignerError, UrlSigner};

/// Content type recorded when a writer supplies none
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Reject keys that could escape the bucket or alias another key.
///
/// A valid key is non-empty, relative, uses `/` only, and has no empty,
/// `.` or `..` segments.
pub fn validate_key(key: &str) -> Result<(), BlobError> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
        || key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if invalid {
        return Err(BlobError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub(crate) fn signing_error(e: SignerError) -> BlobError {
    BlobError::Unavailable(format!("presign failed: {}", e))
}
