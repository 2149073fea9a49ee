//! Oblige Completion Providers
//!
//! Implementations of the `Completer` trait from `oblige-domain`.
//!
//! # Providers
//!
//! - `MockCompleter`: Deterministic mock for testing
//! - `OpenAiCompleter`: OpenAI-compatible chat completions API
//!
//! # Examples
//!
//! ```
//! use oblige_llm::MockCompleter;
//! use oblige_domain::{Completer, CompletionRequest};
//!
//! # async fn example() {
//! let completer = MockCompleter::new("- Keep records");
//! let request = CompletionRequest {
//!     model: "test".to_string(),
//!     system_prompt: "system".to_string(),
//!     user_prompt: "user".to_string(),
//!     temperature: 0.0,
//!     max_output_tokens: 100,
//! };
//! assert_eq!(completer.complete(&request).await.unwrap(), "- Keep records");
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;

use async_trait::async_trait;
use oblige_domain::{Completer, CompletionError, CompletionRequest};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use openai::{OpenAiCompleter, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};

/// Errors that can occur during completion calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the completion service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rejected credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Client construction error
    #[error("Client configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl From<LlmError> for CompletionError {
    fn from(e: LlmError) -> Self {
        CompletionError(e.to_string())
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond(String),
    Fail(String),
}

/// Mock completer for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Scripted responses are matched when the user prompt contains the
/// registered needle; the first registered match wins.
///
/// # Examples
///
/// ```
/// use oblige_llm::MockCompleter;
///
/// let mut completer = MockCompleter::default();
/// completer.add_response("Company: Acme", "- File annual reports");
/// completer.add_error("Location: Atlantis");
/// assert_eq!(completer.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockCompleter {
    default_response: String,
    scripted: Arc<Mutex<Vec<(String, Scripted)>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Option<Duration>,
}

impl MockCompleter {
    /// Create a new MockCompleter with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            scripted: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Create a MockCompleter that fails every call
    pub fn failing(message: impl Into<String>) -> Self {
        let mut completer = Self::default();
        completer.add_error_message("", message);
        completer
    }

    /// Sleep before answering, for exercising timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Return `response` when the user prompt contains `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push((needle.into(), Scripted::Respond(response.into())));
    }

    /// Fail when the user prompt contains `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        self.add_error_message(needle, "Mock error");
    }

    fn add_error_message(&mut self, needle: impl Into<String>, message: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push((needle.into(), Scripted::Fail(message.into())));
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// All requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Forget recorded requests
    pub fn reset(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl Default for MockCompleter {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl Completer for MockCompleter {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| request.user_prompt.contains(needle.as_str()))
            .map(|(_, outcome)| outcome.clone());

        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(LlmError::Other(message).into()),
            None => Ok(self.default_response.clone()),
        }
    }
}
