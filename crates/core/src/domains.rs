//! Allowed-domain list for partner OAuth settings.

use serde::{Deserialize, Serialize};

/// Result of [`DomainSet::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainAdd {
    Added,
    /// The trimmed value is already present (comparison is case-sensitive).
    Duplicate,
    /// The input was empty after trimming.
    Blank,
}

/// Ordered, duplicate-free list of domains allowed to start an OAuth flow.
///
/// ```
/// use campus_points_core::{DomainAdd, DomainSet};
///
/// let mut domains = DomainSet::default();
/// assert_eq!(domains.add("example.com"), DomainAdd::Added);
/// assert_eq!(domains.add(" example.com "), DomainAdd::Duplicate);
/// assert_eq!(domains.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainSet(Vec<String>);

impl DomainSet {
    /// Add a domain after trimming it.
    pub fn add(&mut self, domain: &str) -> DomainAdd {
        let domain = domain.trim();
        if domain.is_empty() {
            return DomainAdd::Blank;
        }
        if self.contains(domain) {
            return DomainAdd::Duplicate;
        }
        self.0.push(domain.to_owned());
        DomainAdd::Added
    }

    /// Remove a domain. Returns `true` if it was present.
    pub fn remove(&mut self, domain: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|d| d != domain);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, domain: &str) -> bool {
        self.0.iter().any(|d| d == domain)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Parse a newline-separated list, dropping blanks and duplicates.
    #[must_use]
    pub fn from_lines(lines: &str) -> Self {
        let mut set = Self::default();
        for line in lines.lines() {
            set.add(line);
        }
        set
    }

    /// Join the domains with newlines (inverse of [`DomainSet::from_lines`]).
    #[must_use]
    pub fn to_lines(&self) -> String {
        self.0.join("\n")
    }
}

impl<S: AsRef<str>> FromIterator<S> for DomainSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::default();
        for domain in iter {
            set.add(domain.as_ref());
        }
        set
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_twice_yields_one_entry() {
        let mut domains = DomainSet::default();
        domains.add("example.com");
        domains.add("example.com");
        assert_eq!(domains.iter().collect::<Vec<_>>(), vec!["example.com"]);
    }

    #[test]
    fn test_duplicates_are_case_sensitive() {
        let mut domains = DomainSet::default();
        assert_eq!(domains.add("Example.com"), DomainAdd::Added);
        assert_eq!(domains.add("example.com"), DomainAdd::Added);
        assert_eq!(domains.len(), 2);
    }

    #[test]
    fn test_blank_is_ignored() {
        let mut domains = DomainSet::default();
        assert_eq!(domains.add("   "), DomainAdd::Blank);
        assert!(domains.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut domains: DomainSet = ["a.edu", "b.edu"].into_iter().collect();
        assert!(domains.remove("a.edu"));
        assert!(!domains.remove("a.edu"));
        assert_eq!(domains.to_lines(), "b.edu");
    }

    #[test]
    fn test_lines_round_trip_keeps_order() {
        let domains = DomainSet::from_lines("b.edu\n\na.edu\r\nb.edu\n");
        assert_eq!(domains.to_lines(), "b.edu\na.edu");
    }

    #[test]
    fn test_deserializes_from_json_array() {
        let domains: DomainSet = serde_json::from_str(r#"["x.org","y.org"]"#).unwrap();
        assert_eq!(domains.len(), 2);
    }
}
