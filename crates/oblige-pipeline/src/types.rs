//! Persisted records and operation results

use oblige_domain::{CompanyProfile, ObligationList};
use serde::{Deserialize, Serialize};

/// Default lifetime of a presigned source URL
pub const DEFAULT_PRESIGN_TTL_SECS: u64 = 3600;

/// Longest lifetime a caller may request for a presigned URL (7 days)
pub const DEFAULT_MAX_PRESIGN_TTL_SECS: u64 = 7 * 24 * 3600;

/// Pipeline settings not owned by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Lifetime of presigned URLs when the caller does not supply one
    #[serde(default = "default_presign_ttl_secs")]
    pub presign_ttl_secs: u64,

    /// Upper bound on a caller-supplied lifetime
    #[serde(default = "default_max_presign_ttl_secs")]
    pub max_presign_ttl_secs: u64,
}

fn default_presign_ttl_secs() -> u64 {
    DEFAULT_PRESIGN_TTL_SECS
}

fn default_max_presign_ttl_secs() -> u64 {
    DEFAULT_MAX_PRESIGN_TTL_SECS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            presign_ttl_secs: DEFAULT_PRESIGN_TTL_SECS,
            max_presign_ttl_secs: DEFAULT_MAX_PRESIGN_TTL_SECS,
        }
    }
}

/// Body written to `output/<base>.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedOutput {
    /// Cleaned obligation lines in model order
    pub obligations: Vec<String>,
}

/// Any output body the pipeline can read back
///
/// Older writers stored a bare JSON array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StoredOutput {
    Wrapped(PersistedOutput),
    Bare(Vec<String>),
}

impl StoredOutput {
    pub(crate) fn into_list(self) -> ObligationList {
        match self {
            StoredOutput::Wrapped(output) => output.obligations.into_iter().collect(),
            StoredOutput::Bare(lines) => lines.into_iter().collect(),
        }
    }
}

/// Body written to `company_info/<uuid>_<name>.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    /// Company name
    pub company_name: String,
    /// Free-text description
    pub company_info: String,
    /// Jurisdiction
    pub location: String,
}

impl From<&CompanyProfile> for ProfileRecord {
    fn from(profile: &CompanyProfile) -> Self {
        Self {
            company_name: profile.company_name.clone(),
            company_info: profile.company_info.clone(),
            location: profile.location.clone(),
        }
    }
}

/// Result of a step that may degrade without failing the operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step succeeded
    Completed,
    /// The step failed and the operation continued
    Degraded {
        /// What went wrong
        cause: String,
    },
}

impl StepOutcome {
    /// Whether the step succeeded
    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Completed)
    }
}

/// Result of `extract_and_persist`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// The extracted obligations, returned even if persistence failed
    pub obligations: ObligationList,
    /// Where the obligations were (or would have been) written
    pub output_key: String,
    /// Outcome of the output write
    pub persistence: StepOutcome,
}

/// Result of `discover_and_persist`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    /// Key of the stored profile record
    pub profile_key: String,
    /// Relevant legislation titles, empty if discovery degraded
    pub regulations: ObligationList,
    /// Outcome of the discovery call
    pub discovery: StepOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_output_shape() {
        let output = PersistedOutput {
            obligations: vec!["File annual reports".to_string()],
        };
        let json = serde_json::to_string(&output).unwrap();
        assert_eq!(json, r#"{"obligations":["File annual reports"]}"#);
    }

    #[test]
    fn test_reads_both_output_shapes() {
        let wrapped: StoredOutput = serde_json::from_str(r#"{"obligations":["a","b"]}"#).unwrap();
        let bare: StoredOutput = serde_json::from_str(r#"["a","b"]"#).unwrap();

        assert_eq!(wrapped.into_list().into_vec(), vec!["a", "b"]);
        assert_eq!(bare.into_list().into_vec(), vec!["a", "b"]);
    }

    #[test]
    fn test_profile_record_is_camel_case() {
        let profile = CompanyProfile::new("Acme", "Online retailer", "Ireland");
        let json = serde_json::to_value(ProfileRecord::from(&profile)).unwrap();

        assert_eq!(json["companyName"], "Acme");
        assert_eq!(json["companyInfo"], "Online retailer");
        assert_eq!(json["location"], "Ireland");
    }

    #[test]
    fn test_pipeline_config_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.presign_ttl_secs, DEFAULT_PRESIGN_TTL_SECS);
        assert_eq!(config.max_presign_ttl_secs, DEFAULT_MAX_PRESIGN_TTL_SECS);
    }
}
