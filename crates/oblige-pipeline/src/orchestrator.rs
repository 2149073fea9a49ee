//! Pipeline orchestrator
//!
//! Composes the blob store, text extraction and the obligation engine into
//! the operations the HTTP surface exposes. The orchestrator owns nothing
//! but `Arc`s to its collaborators, so one instance is shared across all
//! requests.

use crate::error::PipelineError;
use crate::types::{
    Discovered, Extracted, PersistedOutput, PipelineConfig, ProfileRecord, StepOutcome,
    StoredOutput,
};
use oblige_domain::keys::{derive_output_key, profile_key_for, source_key_for, RAW_PREFIX};
use oblige_domain::{BlobStore, CompanyProfile, Completer, ObligationList, PageExtractor};
use oblige_extractor::{ExtractorConfig, ObligationEngine, TextExtraction};
use std::sync::Arc;
use tracing::{debug, info, warn};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Extraction-and-persistence pipeline
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn BlobStore>,
    text: TextExtraction,
    engine: ObligationEngine,
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline over its three collaborators
    pub fn new(
        store: Arc<dyn BlobStore>,
        pages: Arc<dyn PageExtractor>,
        completer: Arc<dyn Completer>,
        extractor_config: ExtractorConfig,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            text: TextExtraction::new(pages),
            engine: ObligationEngine::new(completer, extractor_config),
            config,
        }
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Store an uploaded document under a fresh `raw/` key
    pub async fn upload_source(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, PipelineError> {
        let key = source_key_for(filename)?;
        let size = bytes.len();

        self.store
            .put(&key, bytes, content_type)
            .await
            .map_err(|e| PipelineError::UploadFailed(e.to_string()))?;

        info!(key = %key, size, "Stored source document");
        Ok(key)
    }

    /// Extract obligations from a stored document and persist them.
    ///
    /// The output key is derived before any I/O so a malformed key never
    /// costs a fetch or a completion. A failed output write is logged and
    /// reported in [`Extracted::persistence`]; the obligations are still
    /// returned.
    pub async fn extract_and_persist(
        &self,
        company: &str,
        source_key: &str,
    ) -> Result<Extracted, PipelineError> {
        let output_key = derive_output_key(source_key)?;

        let document = self
            .store
            .get(source_key)
            .await
            .map_err(|e| PipelineError::from_store("fetch", e))?;
        debug!(key = %source_key, size = document.len(), "Fetched source document");

        let text = self.text.extract_text_blocking(document).await?;
        let obligations = self.engine.extract_obligations(company, &text).await?;

        let persistence = self.persist_output(&output_key, &obligations).await;

        info!(
            source = %source_key,
            output = %output_key,
            count = obligations.len(),
            persisted = persistence.is_completed(),
            "Extraction complete"
        );

        Ok(Extracted {
            obligations,
            output_key,
            persistence,
        })
    }

    async fn persist_output(&self, output_key: &str, obligations: &ObligationList) -> StepOutcome {
        let body = PersistedOutput {
            obligations: obligations.as_slice().to_vec(),
        };

        let result = match serde_json::to_vec(&body) {
            Ok(bytes) => self
                .store
                .put(output_key, bytes, JSON_CONTENT_TYPE)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(()) => StepOutcome::Completed,
            Err(cause) => {
                warn!(key = %output_key, error = %cause, "Failed to persist obligations");
                StepOutcome::Degraded { cause }
            }
        }
    }

    /// Extract obligations from inline bytes without storing anything
    pub async fn extract_uploaded(
        &self,
        company: &str,
        bytes: Vec<u8>,
    ) -> Result<ObligationList, PipelineError> {
        let text = self.text.extract_text_blocking(bytes).await?;
        Ok(self.engine.extract_obligations(company, &text).await?)
    }

    /// Record a company profile, then ask for legislation relevant to it.
    ///
    /// A failed profile write fails the call. A failed discovery degrades to
    /// an empty list.
    pub async fn discover_and_persist(
        &self,
        profile: &CompanyProfile,
    ) -> Result<Discovered, PipelineError> {
        let profile_key = profile_key_for(&profile.company_name);
        let body = serde_json::to_vec(&ProfileRecord::from(profile))
            .map_err(|e| PipelineError::UploadFailed(e.to_string()))?;

        self.store
            .put(&profile_key, body, JSON_CONTENT_TYPE)
            .await
            .map_err(|e| PipelineError::UploadFailed(e.to_string()))?;
        info!(key = %profile_key, "Stored company profile");

        let (regulations, discovery) = match self.engine.discover_legislation(profile).await {
            Ok(regulations) => (regulations, StepOutcome::Completed),
            Err(e) => {
                warn!(company = %profile.company_name, error = %e, "Legislation discovery failed");
                (
                    ObligationList::new(),
                    StepOutcome::Degraded {
                        cause: e.to_string(),
                    },
                )
            }
        };

        Ok(Discovered {
            profile_key,
            regulations,
            discovery,
        })
    }

    /// Load the obligations previously persisted for a source.
    ///
    /// A source that has not been processed yet yields an empty list.
    pub async fn fetch_output(&self, source_key: &str) -> Result<ObligationList, PipelineError> {
        let output_key = derive_output_key(source_key)?;

        let bytes = match self.store.get(&output_key).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => {
                debug!(key = %output_key, "No persisted output yet");
                return Ok(ObligationList::new());
            }
            Err(e) => return Err(PipelineError::OutputFetchFailed(e.to_string())),
        };

        let stored: StoredOutput = serde_json::from_slice(&bytes).map_err(|e| {
            PipelineError::OutputFetchFailed(format!("{} is not a valid output: {}", output_key, e))
        })?;

        Ok(stored.into_list())
    }

    /// List stored source documents
    pub async fn list_sources(&self) -> Result<Vec<String>, PipelineError> {
        self.store
            .list(RAW_PREFIX)
            .await
            .map_err(|e| PipelineError::from_store("list", e))
    }

    /// Delete a stored source document; its derived output is kept
    pub async fn delete_source(&self, key: &str) -> Result<(), PipelineError> {
        self.store
            .delete(key)
            .await
            .map_err(|e| PipelineError::from_store("delete", e))?;

        info!(key = %key, "Deleted source document");
        Ok(())
    }

    /// Presigned retrieval URL for a stored object
    pub async fn source_url(&self, key: &str, ttl_secs: Option<u64>) -> Result<String, PipelineError> {
        let ttl = ttl_secs.unwrap_or(self.config.presign_ttl_secs);
        let max = self.config.max_presign_ttl_secs;
        if ttl == 0 || ttl > max {
            return Err(PipelineError::InvalidTtl {
                requested: ttl,
                max,
            });
        }

        self.store
            .presigned_url(key, ttl)
            .await
            .map_err(|e| PipelineError::from_store("presign", e))
    }

    /// Read an object and its recorded content type
    pub async fn read_object(&self, key: &str) -> Result<(Vec<u8>, Option<String>), PipelineError> {
        let bytes = self
            .store
            .get(key)
            .await
            .map_err(|e| PipelineError::from_store("fetch", e))?;
        let content_type = self
            .store
            .content_type(key)
            .await
            .map_err(|e| PipelineError::from_store("fetch", e))?;

        Ok((bytes, content_type))
    }
}
