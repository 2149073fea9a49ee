//! HTTP request handlers for the server.
//!
//! Thin adapters: each handler reads its form or query, calls one pipeline
//! operation and renders the result as JSON. Errors render as
//! `{ "error": message, "stage": label }`.

use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Form, Router as AxumRouter,
};
use oblige_domain::CompanyProfile;
use oblige_pipeline::{Pipeline, PipelineError, StepOutcome};
use oblige_store::{SignerError, UrlSigner, DEFAULT_CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Extraction-and-persistence pipeline
    pub pipeline: Arc<Pipeline>,
    /// Verifies presigned blob links
    pub signer: Arc<UrlSigner>,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

/// Response carrying a storage key
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyResponse {
    /// Storage key
    pub key: String,
}

/// Response carrying an obligation list
#[derive(Debug, Serialize, Deserialize)]
pub struct ObligationsResponse {
    /// Cleaned obligation lines
    pub obligations: Vec<String>,
}

/// Discovery response
#[derive(Debug, Serialize, Deserialize)]
pub struct DiscoverResponse {
    /// Key of the stored profile record
    pub key: String,
    /// Relevant legislation titles
    pub regulations: Vec<String>,
}

/// Source listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    /// Stored source keys
    pub keys: Vec<String>,
}

/// Presigned link response
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlResponse {
    /// Time-limited retrieval URL
    pub url: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Server version
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Stage that failed
    pub stage: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// A pipeline operation failed
    Pipeline(PipelineError),
    /// A required form or query field is absent or blank
    MissingField(&'static str),
    /// The request body could not be read
    BadRequest {
        /// Status reported by the body extractor
        status: StatusCode,
        /// Extractor message
        message: String,
    },
    /// A presigned link token was rejected
    LinkRejected(SignerError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Pipeline(e) => match e {
                PipelineError::MalformedKey(_)
                | PipelineError::EmptyDocumentText
                | PipelineError::InvalidTtl { .. } => StatusCode::BAD_REQUEST,
                PipelineError::NotFound { .. } => StatusCode::NOT_FOUND,
                PipelineError::ExtractionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::CompletionFailed(_) => StatusCode::BAD_GATEWAY,
                PipelineError::StoreUnavailable { .. }
                | PipelineError::UploadFailed(_)
                | PipelineError::OutputFetchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest { status, .. } => *status,
            AppError::LinkRejected(_) => StatusCode::FORBIDDEN,
        }
    }

    fn stage(&self) -> &'static str {
        match self {
            AppError::Pipeline(e) => e.stage(),
            AppError::MissingField(_) | AppError::BadRequest { .. } => "request",
            AppError::LinkRejected(_) => "token",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let stage = self.stage();
        let message = match self {
            AppError::Pipeline(e) => e.to_string(),
            AppError::MissingField(field) => format!("Missing form field: {}", field),
            AppError::BadRequest { message, .. } => message,
            AppError::LinkRejected(e) => e.to_string(),
        };

        if status.is_server_error() {
            error!(stage, error = %message, "Request failed");
        } else {
            debug!(stage, error = %message, "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: message,
            stage: stage.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        AppError::Pipeline(e)
    }
}

impl From<SignerError> for AppError {
    fn from(e: SignerError) -> Self {
        AppError::LinkRejected(e)
    }
}

/// One multipart part or urlencoded value
#[derive(Debug)]
struct FormField {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// Fields of a multipart or urlencoded form, by name
#[derive(Debug, Default)]
struct FormFields(HashMap<String, FormField>);

impl FormFields {
    /// Read a form body, multipart or urlencoded
    async fn read(request: Request) -> Result<Self, AppError> {
        let is_multipart = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| AppError::BadRequest {
                    status: e.status(),
                    message: e.body_text(),
                })?;
            Self::from_multipart(multipart).await
        } else {
            let Form(values) = Form::<HashMap<String, String>>::from_request(request, &())
                .await
                .map_err(|e| AppError::BadRequest {
                    status: e.status(),
                    message: e.body_text(),
                })?;
            let fields = values
                .into_iter()
                .map(|(name, value)| {
                    let field = FormField {
                        file_name: None,
                        content_type: None,
                        data: value.into_bytes(),
                    };
                    (name, field)
                })
                .collect();
            Ok(Self(fields))
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await.map_err(|e| AppError::BadRequest {
            status: e.status(),
            message: e.body_text(),
        })? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(|e| AppError::BadRequest {
                status: e.status(),
                message: e.body_text(),
            })?;

            fields.insert(
                name,
                FormField {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                },
            );
        }

        Ok(Self(fields))
    }

    /// Non-blank text value of a field
    fn text(&self, name: &'static str) -> Result<String, AppError> {
        self.0
            .get(name)
            .map(|field| String::from_utf8_lossy(&field.data).into_owned())
            .filter(|value| !value.trim().is_empty())
            .ok_or(AppError::MissingField(name))
    }

    /// Take a file part
    fn file(&mut self, name: &'static str) -> Result<FormField, AppError> {
        self.0.remove(name).ok_or(AppError::MissingField(name))
    }
}

/// Query naming a source key
#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    /// Source key
    pub key: Option<String>,
    /// Link lifetime override, `/api/pdf-url` only
    pub ttl_secs: Option<u64>,
}

/// Query for `/api/output`
#[derive(Debug, Deserialize)]
pub struct OutputQuery {
    /// Source key whose output is wanted
    #[serde(rename = "pdfKey")]
    pub pdf_key: Option<String>,
}

/// Query for `/api/blob`
#[derive(Debug, Deserialize)]
pub struct BlobQuery {
    /// Presigned link token
    pub token: Option<String>,
}

fn required(value: Option<String>, name: &'static str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::MissingField(name))
}

/// POST /api/upload-pdf - Store a document under a fresh `raw/` key
async fn upload_pdf(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<KeyResponse>), AppError> {
    let mut form = FormFields::read(request).await?;
    let pdf = form.file("pdf")?;

    let key = state
        .pipeline
        .upload_source(
            pdf.file_name.as_deref().unwrap_or_default(),
            pdf.data,
            pdf.content_type.as_deref().unwrap_or(PDF_CONTENT_TYPE),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(KeyResponse { key })))
}

/// POST /api/extract-s3 - Extract obligations from a stored document
async fn extract_stored(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ObligationsResponse>, AppError> {
    let form = FormFields::read(request).await?;
    let company = form.text("company")?;
    let key = form.text("key")?;

    let extracted = state.pipeline.extract_and_persist(&company, &key).await?;
    if let StepOutcome::Degraded { cause } = &extracted.persistence {
        warn!(key = %extracted.output_key, cause = %cause, "Returning unpersisted obligations");
    }

    Ok(Json(ObligationsResponse {
        obligations: extracted.obligations.into_vec(),
    }))
}

/// POST /api/extract - Extract obligations from an inline document
async fn extract_inline(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ObligationsResponse>, AppError> {
    let mut form = FormFields::read(request).await?;
    let company = form.text("company")?;
    let pdf = form.file("pdf")?;

    let obligations = state.pipeline.extract_uploaded(&company, pdf.data).await?;

    Ok(Json(ObligationsResponse {
        obligations: obligations.into_vec(),
    }))
}

/// POST /api/discover - Store a company profile and discover legislation
async fn discover(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<DiscoverResponse>, AppError> {
    let form = FormFields::read(request).await?;
    let profile = CompanyProfile::new(
        form.text("companyName")?,
        form.text("companyInfo")?,
        form.text("location")?,
    );

    let discovered = state.pipeline.discover_and_persist(&profile).await?;

    Ok(Json(DiscoverResponse {
        key: discovered.profile_key,
        regulations: discovered.regulations.into_vec(),
    }))
}

/// GET /api/output - Previously persisted obligations for a source
async fn get_output(
    State(state): State<AppState>,
    Query(query): Query<OutputQuery>,
) -> Result<Json<ObligationsResponse>, AppError> {
    let pdf_key = required(query.pdf_key, "pdfKey")?;
    let obligations = state.pipeline.fetch_output(&pdf_key).await?;

    Ok(Json(ObligationsResponse {
        obligations: obligations.into_vec(),
    }))
}

/// GET /api/list-pdfs - Stored source keys
async fn list_pdfs(State(state): State<AppState>) -> Result<Json<ListResponse>, AppError> {
    let keys = state.pipeline.list_sources().await?;
    Ok(Json(ListResponse { keys }))
}

/// DELETE /api/pdf - Remove a stored source
async fn delete_pdf(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<StatusCode, AppError> {
    let key = required(query.key, "key")?;
    state.pipeline.delete_source(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/pdf-url - Presigned link to a stored source
async fn pdf_url(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<UrlResponse>, AppError> {
    let key = required(query.key, "key")?;
    let url = state.pipeline.source_url(&key, query.ttl_secs).await?;
    Ok(Json(UrlResponse { url }))
}

/// GET /api/blob - Serve the object a presigned link points at
async fn serve_blob(
    State(state): State<AppState>,
    Query(query): Query<BlobQuery>,
) -> Result<Response, AppError> {
    let token = required(query.token, "token")?;
    let key = state.signer.verify(&token)?;

    let (bytes, content_type) = state.pipeline.read_object(&key).await?;
    let content_type = content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    let max_upload_bytes = state.max_upload_bytes;

    AxumRouter::new()
        .route("/api/upload-pdf", post(upload_pdf))
        .route("/api/extract-s3", post(extract_stored))
        .route("/api/extract", post(extract_inline))
        .route("/api/discover", post(discover))
        .route("/api/output", get(get_output))
        .route("/api/list-pdfs", get(list_pdfs))
        .route("/api/pdf", delete(delete_pdf))
        .route("/api/pdf-url", get(pdf_url))
        .route(oblige_store::signer::BLOB_ROUTE, get(serve_blob))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
