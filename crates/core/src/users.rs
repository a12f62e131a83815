//! Request bodies for creating and updating users.

use serde::{Deserialize, Serialize};

use crate::types::Email;

/// Trim a form value, mapping blank input to `None`.
///
/// ```
/// use campus_points_core::non_blank;
///
/// assert_eq!(non_blank("  "), None);
/// assert_eq!(non_blank(" CS "), Some("CS".to_string()));
/// ```
#[must_use]
pub fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Body of `POST /api/points/{org}/users`.
///
/// Optional fields left blank in the form are omitted from the JSON entirely
/// rather than sent as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asu_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_standing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
}

/// Body of `PUT /api/points/{org}/users/{email}`.
///
/// The email is part of the path and never changes. `username` is only sent by
/// the leaderboard editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub asu_id: String,
    pub academic_standing: String,
    pub major: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_user_omits_blank_optionals() {
        let user = NewUser {
            email: Email::parse("new@asu.edu").unwrap(),
            name: "New Member".to_string(),
            asu_id: non_blank(""),
            academic_standing: non_blank("   "),
            major: None,
        };
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({"email": "new@asu.edu", "name": "New Member"})
        );
    }

    #[test]
    fn test_new_user_keeps_filled_optionals() {
        let user = NewUser {
            email: Email::parse("a@asu.edu").unwrap(),
            name: "A".to_string(),
            asu_id: non_blank("1234"),
            academic_standing: None,
            major: non_blank("CS"),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["asu_id"], "1234");
        assert_eq!(value["major"], "CS");
        assert!(value.get("academic_standing").is_none());
    }

    #[test]
    fn test_update_without_username() {
        let update = UserUpdate {
            name: "B".to_string(),
            ..UserUpdate::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert!(value.get("username").is_none());
        assert!(value.get("email").is_none());
        assert_eq!(value["major"], "");
    }
}
