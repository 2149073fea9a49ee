//! In-memory blob store.
//!
//! Holds objects in a sorted map behind a lock. Faults can be injected per
//! operation and key prefix so callers can exercise their error paths.

use crate::signer::UrlSigner;
use crate::{signing_error, validate_key, DEFAULT_CONTENT_TYPE};
use async_trait::async_trait;
use oblige_domain::{BlobError, BlobStore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

/// Operation a fault applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `put`
    Put,
    /// `get`
    Get,
    /// `list`
    List,
    /// `delete`
    Delete,
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// Map-backed implementation of `BlobStore`
///
/// Clones share the same objects and faults.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
    faults: Arc<Mutex<Vec<(Operation, String)>>>,
    signer: Option<Arc<UrlSigner>>,
}

fn lock_error() -> BlobError {
    BlobError::Unavailable("store lock poisoned".to_string())
}

impl MemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a signer for presigned links
    pub fn with_signer(mut self, signer: Arc<UrlSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Make `operation` fail with `Unavailable` for keys starting with `prefix`
    pub fn inject_fault(&self, operation: Operation, prefix: impl Into<String>) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push((operation, prefix.into()));
        }
    }

    /// Remove all injected faults
    pub fn clear_faults(&self) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.clear();
        }
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().map(|objects| objects.len()).unwrap_or(0)
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_fault(&self, operation: Operation, key: &str) -> Result<(), BlobError> {
        let faults = self.faults.lock().map_err(|_| lock_error())?;
        let tripped = faults
            .iter()
            .any(|(op, prefix)| *op == operation && key.starts_with(prefix.as_str()));
        if tripped {
            return Err(BlobError::Unavailable(format!(
                "injected {:?} fault for {}",
                operation, key
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError> {
        validate_key(key)?;
        self.check_fault(Operation::Put, key)?;

        let content_type = if content_type.is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            content_type.to_string()
        };

        self.objects
            .write()
            .map_err(|_| lock_error())?
            .insert(key.to_string(), StoredObject { bytes, content_type });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        validate_key(key)?;
        self.check_fault(Operation::Get, key)?;

        self.objects
            .read()
            .map_err(|_| lock_error())?
            .get(key)
            .map(|object| object.bytes.clone())
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        self.check_fault(Operation::List, prefix)?;

        // BTreeMap iteration is already sorted
        Ok(self
            .objects
            .read()
            .map_err(|_| lock_error())?
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        validate_key(key)?;
        self.check_fault(Operation::Delete, key)?;

        self.objects.write().map_err(|_| lock_error())?.remove(key);
        Ok(())
    }

    async fn presigned_url(&self, key: &str, ttl_secs: u64) -> Result<String, BlobError> {
        validate_key(key)?;
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| BlobError::Unavailable("presigning is not configured".to_string()))?;
        signer.presign(key, ttl_secs).map_err(signing_error)
    }

    async fn content_type(&self, key: &str) -> Result<Option<String>, BlobError> {
        validate_key(key)?;
        Ok(self
            .objects
            .read()
            .map_err(|_| lock_error())?
            .get(key)
            .map(|object| object.content_type.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryBlobStore::new();
        store.put("raw/a.pdf", b"pdf".to_vec(), "application/pdf").await.unwrap();

        assert_eq!(store.get("raw/a.pdf").await.unwrap(), b"pdf");
        assert_eq!(store.len(), 1);

        store.delete("raw/a.pdf").await.unwrap();
        store.delete("raw/a.pdf").await.unwrap();
        assert!(store.is_empty());
        assert!(store.get("raw/a.pdf").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_prefix() {
        let store = MemoryBlobStore::new();
        for key in ["raw/b.pdf", "raw/a.pdf", "output/a.json"] {
            store.put(key, Vec::new(), "").await.unwrap();
        }

        assert_eq!(store.list("raw/").await.unwrap(), vec!["raw/a.pdf", "raw/b.pdf"]);
        assert!(store.list("company_info/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let store = MemoryBlobStore::new();
        store.inject_fault(Operation::Put, "output/");

        let err = store.put("output/a.json", Vec::new(), "").await.unwrap_err();
        assert!(matches!(err, BlobError::Unavailable(_)));
        store.put("raw/a.pdf", Vec::new(), "").await.unwrap();

        store.inject_fault(Operation::Get, "raw/");
        assert!(matches!(
            store.get("raw/a.pdf").await,
            Err(BlobError::Unavailable(_))
        ));

        store.clear_faults();
        store.put("output/a.json", Vec::new(), "").await.unwrap();
        assert!(store.get("raw/a.pdf").await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_objects() {
        let store = MemoryBlobStore::new();
        let view = store.clone();
        store.put("raw/a.pdf", Vec::new(), "").await.unwrap();
        assert_eq!(view.len(), 1);
    }
}
