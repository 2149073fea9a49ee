//! Obligation engine: prompt, complete, parse

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_completion;
use crate::prompt::{PromptBuilder, PromptPair};
use oblige_domain::{CompanyProfile, Completer, CompletionRequest, ObligationList};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Turns legislation text or a company profile into an obligation list
#[derive(Clone)]
pub struct ObligationEngine {
    completer: Arc<dyn Completer>,
    config: ExtractorConfig,
}

impl ObligationEngine {
    /// Create a new engine
    pub fn new(completer: Arc<dyn Completer>, config: ExtractorConfig) -> Self {
        Self { completer, config }
    }

    /// Engine configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// List the obligations `legislation_text` places on `company`.
    ///
    /// Only the configured leading window of the text reaches the model.
    pub async fn extract_obligations(
        &self,
        company: &str,
        legislation_text: &str,
    ) -> Result<ObligationList, ExtractorError> {
        let window = self.config.legislation_window_chars;
        let total_chars = legislation_text.chars().count();
        if total_chars > window {
            info!(
                total_chars,
                window, "Legislation text exceeds prompt window, trailing text not considered"
            );
        }

        let prompt = PromptBuilder::obligations(company, legislation_text, window);
        let obligations = self.run(prompt).await?;

        info!(count = obligations.len(), "Extracted obligations");
        Ok(obligations)
    }

    /// List legislation likely to apply to the profiled company
    pub async fn discover_legislation(
        &self,
        profile: &CompanyProfile,
    ) -> Result<ObligationList, ExtractorError> {
        let prompt = PromptBuilder::discovery(profile);
        let regulations = self.run(prompt).await?;

        info!(
            company = %profile.company_name,
            count = regulations.len(),
            "Discovered relevant legislation"
        );
        Ok(regulations)
    }

    async fn run(&self, prompt: PromptPair) -> Result<ObligationList, ExtractorError> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            system_prompt: prompt.system,
            user_prompt: prompt.user,
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        };

        debug!(prompt_chars = request.user_prompt.len(), "Calling completer");

        let response = timeout(
            self.config.completion_timeout(),
            self.completer.complete(&request),
        )
        .await
        .map_err(|_| {
            warn!(
                timeout_secs = self.config.completion_timeout_secs,
                "Completion timed out"
            );
            ExtractorError::CompletionFailed(format!(
                "timed out after {}s",
                self.config.completion_timeout_secs
            ))
        })??;

        debug!(response_chars = response.len(), "Completer responded");
        Ok(parse_completion(&response))
    }
}
