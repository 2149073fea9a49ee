//! Configuration file parsing for the server.
//!
//! Loads settings from a TOML file with four sections (`server`, `storage`,
//! `llm`, `presign`), then applies environment overrides for secrets and
//! model tuning.

use oblige_extractor::{ExtractorConfig, DEFAULT_LEGISLATION_WINDOW_CHARS};
use oblige_pipeline::{PipelineConfig, DEFAULT_MAX_PRESIGN_TTL_SECS, DEFAULT_PRESIGN_TTL_SECS};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A value is out of range or unparsable
    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Offending field or variable
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener settings
    pub server: HttpSection,
    /// Blob storage settings
    pub storage: StorageSection,
    /// Completion service settings
    pub llm: LlmSection,
    /// Presigned URL settings
    pub presign: PresignSection,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,
    /// Bind port (e.g., 8080)
    pub bind_port: u16,
    /// Externally reachable base URL used in presigned links
    pub public_base_url: String,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            public_base_url: "http://127.0.0.1:8080".to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// `[storage]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory holding all buckets
    pub root_dir: PathBuf,
    /// Bucket name
    pub bucket: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./data"),
            bucket: "oblige".to_string(),
        }
    }
}

/// `[llm]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// Chat completions base URL
    pub endpoint: String,
    /// API key, usually supplied through `OPENAI_API_KEY`
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Completion timeout in seconds
    pub timeout_secs: u64,
    /// Leading characters of legislation sent to the model
    pub legislation_window_chars: usize,
}

impl Default for LlmSection {
    fn default() -> Self {
        let extractor = ExtractorConfig::default();
        Self {
            endpoint: oblige_llm::DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            model: extractor.model,
            temperature: extractor.temperature,
            max_tokens: extractor.max_output_tokens,
            timeout_secs: extractor.completion_timeout_secs,
            legislation_window_chars: DEFAULT_LEGISLATION_WINDOW_CHARS,
        }
    }
}

/// `[presign]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PresignSection {
    /// HMAC secret for link tokens
    pub secret: String,
    /// Link lifetime in seconds (default: 3600 = 1 hour)
    pub ttl_secs: u64,
    /// Longest lifetime a caller may ask for (default: 604800 = 7 days)
    pub max_ttl_secs: u64,
}

impl Default for PresignSection {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_secs: DEFAULT_PRESIGN_TTL_SECS,
            max_ttl_secs: DEFAULT_MAX_PRESIGN_TTL_SECS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file, apply environment overrides
    /// and validate the result
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: ServerConfig = toml::from_str(&contents)?;

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Create a default configuration for local development
    pub fn default_test_config() -> Self {
        let mut config = ServerConfig::default();
        config.presign.secret = "test-secret-key-do-not-use-in-production".to_string();
        config
    }

    /// Apply overrides from `lookup` (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.api_key = key;
        }
        if let Some(model) = lookup("OBLIGE_MODEL") {
            self.llm.model = model;
        }
        if let Some(value) = lookup("OBLIGE_TEMPERATURE") {
            self.llm.temperature = parse_override("OBLIGE_TEMPERATURE", &value)?;
        }
        if let Some(value) = lookup("OBLIGE_MAX_TOKENS") {
            self.llm.max_tokens = parse_override("OBLIGE_MAX_TOKENS", &value)?;
        }
        if let Some(secret) = lookup("OBLIGE_SIGNING_SECRET") {
            self.presign.secret = secret;
        }
        Ok(())
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.presign.secret.is_empty() {
            return Err(ConfigError::MissingField("presign.secret".to_string()));
        }
        if self.presign.ttl_secs == 0 {
            return Err(invalid("presign.ttl_secs", "must be greater than 0"));
        }
        if self.presign.ttl_secs > self.presign.max_ttl_secs {
            return Err(invalid("presign.ttl_secs", "must not exceed presign.max_ttl_secs"));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::MissingField("storage.bucket".to_string()));
        }
        self.extractor_config()
            .validate()
            .map_err(|reason| invalid("llm", &reason))
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
    }

    /// Directory backing the configured bucket
    pub fn bucket_dir(&self) -> PathBuf {
        self.storage.root_dir.join(&self.storage.bucket)
    }

    /// Engine settings derived from the `[llm]` section
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            max_output_tokens: self.llm.max_tokens,
            legislation_window_chars: self.llm.legislation_window_chars,
            completion_timeout_secs: self.llm.timeout_secs,
        }
    }

    /// Pipeline settings derived from the `[presign]` section
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            presign_ttl_secs: self.presign.ttl_secs,
            max_presign_ttl_secs: self.presign.max_ttl_secs,
        }
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(name, &e.to_string()))
}
