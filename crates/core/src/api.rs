//! Helpers for points API response bodies.

use serde_json::Value;

/// Pull the human-readable message out of an error body.
///
/// The points API reports failures as `{"error": "..."}` or
/// `{"message": "..."}`; `error` wins when both are present. Returns `None`
/// for bodies that are not JSON or carry neither field.
///
/// ```
/// use campus_points_core::api::extract_error_message;
///
/// assert_eq!(
///     extract_error_message(r#"{"error":"User not found"}"#).as_deref(),
///     Some("User not found")
/// );
/// assert_eq!(extract_error_message("<html>"), None);
/// ```
#[must_use]
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"].into_iter().find_map(|key| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ToString::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_preferred_over_message() {
        let body = r#"{"message":"generic","error":"specific"}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("specific"));
    }

    #[test]
    fn test_message_fallback() {
        let body = r#"{"message":"Order failed"}"#;
        assert_eq!(extract_error_message(body).as_deref(), Some("Order failed"));
    }

    #[test]
    fn test_blank_and_non_string_fields_ignored() {
        assert_eq!(extract_error_message(r#"{"error":"  "}"#), None);
        assert_eq!(extract_error_message(r#"{"error":42}"#), None);
        assert_eq!(extract_error_message(""), None);
    }
}
