//! Configuration for the obligation engine

use std::time::Duration;

/// Leading window of legislation text sent to the model (characters)
pub const DEFAULT_LEGISLATION_WINDOW_CHARS: usize = 12_000;

/// Configuration for the obligation engine
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Model identifier passed to the completer
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum output tokens per completion
    pub max_output_tokens: u32,

    /// Leading characters of legislation text included in the prompt
    pub legislation_window_chars: usize,

    /// Maximum time for a single completion call (seconds)
    pub completion_timeout_secs: u64,
}

impl ExtractorConfig {
    /// Get the completion timeout as a Duration
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if self.max_output_tokens == 0 {
            return Err("max_output_tokens must be greater than 0".to_string());
        }
        if self.legislation_window_chars == 0 {
            return Err("legislation_window_chars must be greater than 0".to_string());
        }
        if self.completion_timeout_secs == 0 {
            return Err("completion_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_output_tokens: 10_000,
            legislation_window_chars: DEFAULT_LEGISLATION_WINDOW_CHARS,
            completion_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.legislation_window_chars, 12_000);
        assert_eq!(config.completion_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_window() {
        let mut config = ExtractorConfig::default();
        config.legislation_window_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_temperature() {
        let mut config = ExtractorConfig::default();
        config.temperature = 2.5;
        assert!(config.validate().is_err());
        config.temperature = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = ExtractorConfig::default();
        config.completion_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
