//! Obligation lists
//!
//! An obligation is one line of model output after bullet markers and
//! surrounding whitespace are removed. Lists keep model order and may hold
//! duplicates.

/// Leading markers removed from every obligation line
pub const BULLET_MARKERS: &[char] = &['-', '–', '•', ' '];

/// Clean one raw line into an obligation.
///
/// Returns `None` when nothing is left after stripping.
///
/// # Examples
///
/// ```
/// use oblige_domain::obligation::clean_line;
///
/// assert_eq!(clean_line("- Keep records"), Some("Keep records".to_string()));
/// assert_eq!(clean_line(" • "), None);
/// ```
pub fn clean_line(line: &str) -> Option<String> {
    let cleaned = line.trim_start_matches(BULLET_MARKERS).trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Ordered list of cleaned obligation strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObligationList(Vec<String>);

impl ObligationList {
    /// Create an empty list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a list from raw model output, one obligation per line
    pub fn from_lines(raw: &str) -> Self {
        Self(raw.lines().filter_map(clean_line).collect())
    }

    /// Append a raw line; returns false when it cleaned down to nothing
    pub fn push(&mut self, line: &str) -> bool {
        match clean_line(line) {
            Some(cleaned) => {
                self.0.push(cleaned);
                true
            }
            None => false,
        }
    }

    /// Number of obligations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the obligations
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Take the obligations out of the list
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Iterate over the obligations
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ObligationList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .filter_map(|line| clean_line(line.as_ref()))
                .collect(),
        )
    }
}

impl IntoIterator for ObligationList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<ObligationList> for Vec<String> {
    fn from(list: ObligationList) -> Self {
        list.0
    }
}
