//! Integration tests for oblige-store
//!
//! These tests verify that both backends honour the same `BlobStore`
//! contract and that presigned links resolve back to their key.

use oblige_domain::{BlobError, BlobStore};
use oblige_store::{FsBlobStore, MemoryBlobStore, UrlSigner};
use std::sync::Arc;
use tempfile::TempDir;

async fn exercise_contract(store: &dyn BlobStore) {
    // Missing keys are NotFound, not a transport error
    let err = store.get("output/none.json").await.unwrap_err();
    assert!(err.is_not_found());

    // Empty listing is not an error
    assert!(store.list("raw/").await.unwrap().is_empty());

    store
        .put("raw/1_act.pdf", b"%PDF-1.4".to_vec(), "application/pdf")
        .await
        .unwrap();
    store
        .put("raw/2_act.pdf", b"%PDF-1.5".to_vec(), "application/pdf")
        .await
        .unwrap();
    store
        .put("output/1_act.json", br#"{"obligations":[]}"#.to_vec(), "application/json")
        .await
        .unwrap();

    assert_eq!(
        store.list("raw/").await.unwrap(),
        vec!["raw/1_act.pdf".to_string(), "raw/2_act.pdf".to_string()]
    );
    assert_eq!(store.get("raw/2_act.pdf").await.unwrap(), b"%PDF-1.5");
    assert_eq!(
        store.content_type("output/1_act.json").await.unwrap().as_deref(),
        Some("application/json")
    );

    // Deleting a source leaves the derived output alone
    store.delete("raw/1_act.pdf").await.unwrap();
    store.delete("raw/1_act.pdf").await.unwrap();
    assert_eq!(store.list("raw/").await.unwrap(), vec!["raw/2_act.pdf".to_string()]);
    assert!(store.get("output/1_act.json").await.is_ok());

    let err = store.put("raw/../../etc/passwd", Vec::new(), "").await.unwrap_err();
    assert!(matches!(err, BlobError::InvalidKey(_)));
}

#[tokio::test]
async fn test_memory_store_contract() {
    let store = MemoryBlobStore::new();
    exercise_contract(&store).await;
}

#[tokio::test]
async fn test_fs_store_contract() {
    let dir = TempDir::new().unwrap();
    let store = FsBlobStore::new(dir.path());
    exercise_contract(&store).await;
}

#[tokio::test]
async fn test_fs_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    FsBlobStore::new(dir.path())
        .put("company_info/9_Acme.json", b"{}".to_vec(), "application/json")
        .await
        .unwrap();

    let reopened = FsBlobStore::new(dir.path());
    assert_eq!(reopened.get("company_info/9_Acme.json").await.unwrap(), b"{}");
}

#[tokio::test]
async fn test_presigned_link_round_trip() {
    let signer = Arc::new(UrlSigner::new("integration-secret", "https://oblige.example"));
    let store = MemoryBlobStore::new().with_signer(signer.clone());
    store.put("raw/1_act.pdf", b"pdf".to_vec(), "application/pdf").await.unwrap();

    let url = store.presigned_url("raw/1_act.pdf", 3600).await.unwrap();
    let token = url
        .split_once("token=")
        .map(|(_, token)| token)
        .expect("url carries a token");

    let key = signer.verify(token).unwrap();
    assert_eq!(store.get(&key).await.unwrap(), b"pdf");
}
