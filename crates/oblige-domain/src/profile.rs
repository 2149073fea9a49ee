//! Company intake profile

/// Details a company submits before legislation discovery.
///
/// Persisted verbatim as an audit record; the pipeline never reads it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyProfile {
    /// Trading or legal name
    pub company_name: String,

    /// Free-text description of what the company does
    pub company_info: String,

    /// Country or region the company operates in
    pub location: String,
}

impl CompanyProfile {
    /// Create a new profile
    pub fn new(
        company_name: impl Into<String>,
        company_info: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            company_info: company_info.into(),
            location: location.into(),
        }
    }
}
