//! Filesystem blob store.
//!
//! Layout under the bucket directory:
//!
//! - `objects/<key>` holds object bytes
//! - `meta/<key>` holds the content type
//! - `tmp/` holds in-flight writes
//!
//! Writes land in `tmp/` and are renamed into place, so readers never see a
//! partial object and concurrent writers resolve last-writer-wins.

use crate::signer::UrlSigner;
use crate::{signing_error, validate_key, DEFAULT_CONTENT_TYPE};
use async_trait::async_trait;
use oblige_domain::{BlobError, BlobStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

/// Filesystem-backed implementation of `BlobStore`
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    bucket_dir: PathBuf,
    signer: Option<Arc<UrlSigner>>,
}

fn io_error(context: &str, e: std::io::Error) -> BlobError {
    BlobError::Unavailable(format!("{}: {}", context, e))
}

impl FsBlobStore {
    /// Create a store rooted at `bucket_dir`; directories are created lazily
    pub fn new(bucket_dir: impl Into<PathBuf>) -> Self {
        Self {
            bucket_dir: bucket_dir.into(),
            signer: None,
        }
    }

    /// Attach a signer for presigned links
    pub fn with_signer(mut self, signer: Arc<UrlSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Bucket directory this store writes to
    pub fn bucket_dir(&self) -> &Path {
        &self.bucket_dir
    }

    fn objects_dir(&self) -> PathBuf {
        self.bucket_dir.join("objects")
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.objects_dir().join(key)
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.bucket_dir.join("meta").join(key)
    }

    async fn write_atomic(&self, final_path: &Path, bytes: &[u8]) -> Result<(), BlobError> {
        let tmp_dir = self.bucket_dir.join("tmp");
        fs::create_dir_all(&tmp_dir)
            .await
            .map_err(|e| io_error("create tmp dir", e))?;
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create object dir", e))?;
        }

        let tmp_path = tmp_dir.join(uuid::Uuid::new_v4().to_string());
        fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| io_error("write temp file", e))?;

        if let Err(e) = fs::rename(&tmp_path, final_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(io_error("rename into place", e));
        }
        Ok(())
    }

    async fn remove_if_present(path: &Path) -> Result<(), BlobError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove file", e)),
        }
    }

    /// Walk `objects/` and collect every key
    async fn all_keys(&self) -> Result<Vec<String>, BlobError> {
        let root = self.objects_dir();
        let mut keys = Vec::new();
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(io_error("read dir", e)),
            };

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| io_error("read dir entry", e))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| io_error("stat entry", e))?;

                if file_type.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&root) {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    keys.push(key);
                }
            }
        }

        Ok(keys)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BlobError> {
        validate_key(key)?;
        debug!(key, size = bytes.len(), "Writing object");

        let content_type = if content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            content_type
        };

        // The object rename is the commit point: a key is only visible once
        // its bytes are in place, so the content type goes down first.
        let meta_path = self.meta_path(key);
        let previous_meta = fs::read(&meta_path).await.ok();
        self.write_atomic(&meta_path, content_type.as_bytes()).await?;

        if let Err(e) = self.write_atomic(&self.object_path(key), &bytes).await {
            let restored = match previous_meta {
                Some(previous) => self.write_atomic(&meta_path, &previous).await,
                None => Self::remove_if_present(&meta_path).await,
            };
            if let Err(restore_err) = restored {
                warn!(key, error = %restore_err, "Failed to roll back content type record");
            }
            return Err(e);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        validate_key(key)?;
        match fs::read(self.object_path(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobError::NotFound(key.to_string())),
            Err(e) => Err(io_error("read object", e)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        let mut keys: Vec<String> = self
            .all_keys()
            .await?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        validate_key(key)?;
        Self::remove_if_present(&self.object_path(key)).await?;
        if let Err(e) = Self::remove_if_present(&self.meta_path(key)).await {
            warn!(key, error = %e, "Failed to remove content type record");
        }
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
        match fs::read_to_string(self.meta_path(key)).await {
            Ok(content_type) => Ok(Some(content_type)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read content type", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, FsBlobStore) {
        let dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(dir.path().join("bucket"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let (_dir, store) = create_test_store();
        store
            .put("raw/abc_act.pdf", b"%PDF-1.7".to_vec(), "application/pdf")
            .await
            .unwrap();

        assert_eq!(store.get("raw/abc_act.pdf").await.unwrap(), b"%PDF-1.7");
        assert_eq!(
            store.content_type("raw/abc_act.pdf").await.unwrap().as_deref(),
            Some("application/pdf")
        );
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (_dir, store) = create_test_store();
        store.put("output/a.json", b"[1]".to_vec(), "application/json").await.unwrap();
        store.put("output/a.json", b"[2]".to_vec(), "application/json").await.unwrap();

        assert_eq!(store.get("output/a.json").await.unwrap(), b"[2]");
        assert_eq!(store.list("output/").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_object_write_leaves_no_trace() {
        let (_dir, store) = create_test_store();
        // a file where the key's parent directory should be
        let objects = store.bucket_dir().join("objects");
        std::fs::create_dir_all(&objects).unwrap();
        std::fs::write(objects.join("output"), b"").unwrap();

        assert!(store.put("output/a.json", b"[1]".to_vec(), "application/json").await.is_err());

        assert!(store.list("output/").await.unwrap().is_empty());
        assert_eq!(store.content_type("output/a.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_object_write_keeps_previous_content_type() {
        let (_dir, store) = create_test_store();
        store.put("raw/a.pdf", b"%PDF".to_vec(), "application/pdf").await.unwrap();
        // replace the stored object with a directory so the rename fails
        let object = store.bucket_dir().join("objects").join("raw").join("a.pdf");
        std::fs::remove_file(&object).unwrap();
        std::fs::create_dir_all(object.join("blocker")).unwrap();

        assert!(store.put("raw/a.pdf", b"<html>".to_vec(), "text/html").await.is_err());
        assert_eq!(
            store.content_type("raw/a.pdf").await.unwrap().as_deref(),
            Some("application/pdf")
        );
    }

    #[tokio::test]
    async fn test_failed_meta_write_stores_nothing() {
        let (_dir, store) = create_test_store();
        let meta = store.bucket_dir().join("meta");
        std::fs::create_dir_all(&meta).unwrap();
        std::fs::write(meta.join("output"), b"").unwrap();

        assert!(store.put("output/a.json", b"[1]".to_vec(), "application/json").await.is_err());
        assert_eq!(
            store.get("output/a.json").await.unwrap_err(),
            BlobError::NotFound("output/a.json".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_dir, store) = create_test_store();
        let err = store.get("output/missing.json").await.unwrap_err();
        assert_eq!(err, BlobError::NotFound("output/missing.json".to_string()));
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let (_dir, store) = create_test_store();
        for key in ["raw/b.pdf", "raw/a.pdf", "output/a.json", "company_info/x.json"] {
            store.put(key, Vec::new(), "").await.unwrap();
        }

        assert_eq!(store.list("raw/").await.unwrap(), vec!["raw/a.pdf", "raw/b.pdf"]);
        assert_eq!(store.list("").await.unwrap().len(), 4);
        assert!(store.list("missing/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_on_fresh_bucket_is_empty() {
        let (_dir, store) = create_test_store();
        assert!(store.list("raw/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, store) = create_test_store();
        store.put("raw/a.pdf", b"x".to_vec(), "application/pdf").await.unwrap();

        store.delete("raw/a.pdf").await.unwrap();
        store.delete("raw/a.pdf").await.unwrap();

        assert!(store.get("raw/a.pdf").await.unwrap_err().is_not_found());
        assert_eq!(store.content_type("raw/a.pdf").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_default_content_type() {
        let (_dir, store) = create_test_store();
        store.put("raw/a.bin", b"x".to_vec(), "").await.unwrap();
        assert_eq!(
            store.content_type("raw/a.bin").await.unwrap().as_deref(),
            Some(DEFAULT_CONTENT_TYPE)
        );
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let (_dir, store) = create_test_store();
        let err = store.put("../escape.txt", b"x".to_vec(), "").await.unwrap_err();
        assert!(matches!(err, BlobError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_presign_requires_signer() {
        let (_dir, store) = create_test_store();
        let err = store.presigned_url("raw/a.pdf", 60).await.unwrap_err();
        assert!(matches!(err, BlobError::Unavailable(_)));

        let store = store.with_signer(Arc::new(UrlSigner::new("secret", "http://localhost:8000")));
        let url = store.presigned_url("raw/a.pdf", 60).await.unwrap();
        assert!(url.starts_with("http://localhost:8000/api/blob?token="));
    }
}
