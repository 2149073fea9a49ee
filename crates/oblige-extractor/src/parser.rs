//! Parse completion output into obligation lists

use oblige_domain::ObligationList;
use tracing::debug;

/// Split a completion body into cleaned obligations.
///
/// One obligation per line; bullet markers and surrounding whitespace are
/// removed and blank lines dropped. An empty result is a valid answer.
pub fn parse_completion(response: &str) -> ObligationList {
    let list = ObligationList::from_lines(response);
    debug!(
        lines = response.lines().count(),
        kept = list.len(),
        "Parsed completion"
    );
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bulleted_lines() {
        let list = parse_completion("- Do X\n• Do Y\n  Do Z  \n");
        assert_eq!(list.as_slice(), &["Do X", "Do Y", "Do Z"]);
    }

    #[test]
    fn test_parse_drops_blank_lines() {
        let list = parse_completion("- Do X\n\n\n- Do Y");
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse_completion("").is_empty());
        assert!(parse_completion("\n  \n").is_empty());
    }

    #[test]
    fn test_parse_keeps_numbering() {
        let list = parse_completion("1. Register with the authority");
        assert_eq!(list.as_slice(), &["1. Register with the authority"]);
    }
}
