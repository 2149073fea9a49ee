//! Prompt construction for obligation extraction and legislation discovery

use oblige_domain::CompanyProfile;

/// System and user instructions for one completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    /// Fixed instruction describing the task
    pub system: String,
    /// Caller-specific content
    pub user: String,
}

/// Builds the two prompt shapes the engine sends
pub struct PromptBuilder;

impl PromptBuilder {
    /// Prompt for listing the obligations a legislation text places on a company.
    ///
    /// Only the first `window_chars` characters of the text are included.
    pub fn obligations(company: &str, legislation_text: &str, window_chars: usize) -> PromptPair {
        let window = leading_chars(legislation_text, window_chars);
        PromptPair {
            system: OBLIGATION_INSTRUCTIONS.to_string(),
            user: format!("Company: {}\n\nLegislation:\n{}", company, window),
        }
    }

    /// Prompt for listing legislation likely to apply to a company
    pub fn discovery(profile: &CompanyProfile) -> PromptPair {
        PromptPair {
            system: DISCOVERY_INSTRUCTIONS.to_string(),
            user: format!(
                "Company name: {}\nCompany description: {}\nLocation: {}",
                profile.company_name, profile.company_info, profile.location
            ),
        }
    }
}

/// Borrow at most `max_chars` leading characters of `text`
pub fn leading_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

const OBLIGATION_INSTRUCTIONS: &str = "You are a senior compliance analyst. \
Given legislation text, list every explicit obligation the company must follow. \
Respond with one line per obligation, no extra headings.";

const DISCOVERY_INSTRUCTIONS: &str = "You are a senior regulatory research analyst. \
Given a company profile and the jurisdiction it operates in, list every act, regulation \
and standard the company is likely subject to. \
Respond with one line per item, no extra headings.";
