//! Organization prefix type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrgPrefix`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrgPrefixError {
    /// The prefix is empty.
    #[error("organization prefix cannot be empty")]
    Empty,
    /// The prefix is longer than allowed.
    #[error("organization prefix must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The prefix contains a character that is not URL-safe.
    #[error("organization prefix contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Short slug identifying a tenant organization (e.g. `soda`).
///
/// Used verbatim as a path segment across every points API endpoint and as the
/// suffix of per-organization session keys such as `cart_{org}`, so only ASCII
/// letters, digits, `-` and `_` are accepted.
///
/// ```
/// use campus_points_core::OrgPrefix;
///
/// let org = OrgPrefix::parse("soda").unwrap();
/// assert_eq!(org.as_str(), "soda");
/// assert!(OrgPrefix::parse("../admin").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrgPrefix(String);

impl OrgPrefix {
    /// Maximum accepted prefix length.
    pub const MAX_LENGTH: usize = 64;

    /// Parse an organization prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is empty, too long, or contains
    /// characters other than ASCII alphanumerics, `-` and `_`.
    pub fn parse(s: &str) -> Result<Self, OrgPrefixError> {
        if s.is_empty() {
            return Err(OrgPrefixError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(OrgPrefixError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(OrgPrefixError::InvalidCharacter(bad));
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the prefix as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrgPrefix {
    type Error = OrgPrefixError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrgPrefix> for String {
    fn from(prefix: OrgPrefix) -> Self {
        prefix.0
    }
}

impl std::str::FromStr for OrgPrefix {
    type Err = OrgPrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for OrgPrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(OrgPrefix::parse("soda").is_ok());
        assert!(OrgPrefix::parse("acm-asu").is_ok());
        assert!(OrgPrefix::parse("wics_2024").is_ok());
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(OrgPrefix::parse(""), Err(OrgPrefixError::Empty));
        assert_eq!(
            OrgPrefix::parse("a/b"),
            Err(OrgPrefixError::InvalidCharacter('/'))
        );
        assert!(OrgPrefix::parse(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: OrgPrefix = serde_json::from_str("\"soda\"").unwrap();
        assert_eq!(ok.as_str(), "soda");
        assert!(serde_json::from_str::<OrgPrefix>("\"so da\"").is_err());
    }
}
