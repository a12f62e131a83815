//! Request and response bodies for the officer and superadmin endpoints.

use serde::{Deserialize, Serialize};

use campus_points_core::{DomainSet, LeaderboardEntry, OrderStatus, OrgId, Price};

// =============================================================================
// OAuth
// =============================================================================

/// Body of `GET`/`PUT /api/superadmin/organizations/{id}/oauth`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSettings {
    #[serde(default)]
    pub oauth_enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub oauth_callback_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub allowed_domains: DomainSet,
}

/// Organization as returned after saving OAuth settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationInfo {
    pub id: OrgId,
    pub name: String,
    pub prefix: String,
    #[serde(default)]
    pub oauth_enabled: bool,
    #[serde(default)]
    pub oauth_callback_url: Option<String>,
    #[serde(default)]
    pub allowed_domains: Option<Vec<String>>,
    #[serde(default)]
    pub storefront_enabled: bool,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthSaveResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub organization: OrganizationInfo,
}

/// Body of `POST /api/superadmin/organizations/{id}/oauth/test`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTestReport {
    pub organization: String,
    pub oauth_config: OAuthConfigCheck,
}

/// Per-field validity of an organization's OAuth configuration.
///
/// The URL and domain checks are only present when there is something to
/// check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfigCheck {
    #[serde(default)]
    pub oauth_enabled: bool,
    #[serde(default)]
    pub has_callback_url: bool,
    #[serde(default)]
    pub has_allowed_domains: bool,
    #[serde(default)]
    pub domains_count: u32,
    #[serde(default)]
    pub callback_url_valid: Option<bool>,
    #[serde(default)]
    pub callback_url_error: Option<String>,
    #[serde(default)]
    pub valid_domains: Option<Vec<String>>,
    #[serde(default)]
    pub invalid_domains: Option<Vec<String>>,
    #[serde(default)]
    pub all_domains_valid: Option<bool>,
}

impl OAuthConfigCheck {
    /// "Fully Configured" only when every domain checked out.
    #[must_use]
    pub fn fully_configured(&self) -> bool {
        self.all_domains_valid == Some(true)
    }

    #[must_use]
    pub const fn callback_url_label(&self) -> &'static str {
        match self.callback_url_valid {
            Some(true) => "Valid",
            Some(false) => "Invalid",
            None => "Not checked",
        }
    }
}

/// Body of `GET /api/superadmin/organizations/oauth/summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSummary {
    pub total_organizations: u32,
    pub oauth_enabled_count: u32,
    pub oauth_configured_count: u32,
    pub organizations_with_domains: u32,
    pub organizations_with_callbacks: u32,
    #[serde(default)]
    pub organizations_details: Vec<OrgOAuthDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgOAuthDetail {
    pub id: OrgId,
    pub name: String,
    pub prefix: String,
    #[serde(default)]
    pub oauth_enabled: bool,
    #[serde(default)]
    pub oauth_callback_url: Option<String>,
    #[serde(default)]
    pub allowed_domains: Option<Vec<String>>,
    #[serde(default)]
    pub storefront_enabled: bool,
    #[serde(default)]
    pub is_active: bool,
}

// =============================================================================
// Points
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardResponse {
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Body of `DELETE /api/points/{org}/delete_points`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletePoints<'a> {
    pub user_email: &'a str,
    pub event: &'a str,
}

/// Generic `{message}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Merchandise
// =============================================================================

/// Body of product create and update requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Price,
    pub stock: u32,
    pub description: String,
    pub image_url: String,
}

/// Body of `PUT /api/merch/{org}/orders/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_oauth_settings_tolerates_nulls() {
        let settings: OAuthSettings = serde_json::from_value(json!({
            "oauth_enabled": true,
            "oauth_callback_url": null,
            "allowed_domains": null,
            "oauth_state_secret": "ignored"
        }))
        .unwrap();
        assert!(settings.oauth_enabled);
        assert_eq!(settings.oauth_callback_url, "");
        assert!(settings.allowed_domains.is_empty());
    }

    #[test]
    fn test_settings_serialize_domains_as_list() {
        let settings = OAuthSettings {
            oauth_enabled: false,
            oauth_callback_url: "https://partner.edu/cb".to_string(),
            allowed_domains: DomainSet::from_lines("partner.edu\nasu.edu"),
        };
        assert_eq!(
            serde_json::to_value(&settings).unwrap(),
            json!({
                "oauth_enabled": false,
                "oauth_callback_url": "https://partner.edu/cb",
                "allowed_domains": ["partner.edu", "asu.edu"]
            })
        );
    }

    #[test]
    fn test_test_report_optional_checks() {
        let report: OAuthTestReport = serde_json::from_value(json!({
            "organization": "ACM",
            "oauth_config": {
                "oauth_enabled": true,
                "has_callback_url": false,
                "has_allowed_domains": true,
                "domains_count": 2,
                "has_state_secret": true,
                "valid_domains": ["asu.edu"],
                "invalid_domains": ["not a domain"],
                "all_domains_valid": false
            }
        }))
        .unwrap();
        assert_eq!(report.oauth_config.callback_url_valid, None);
        assert!(!report.oauth_config.fully_configured());
        assert_eq!(report.oauth_config.invalid_domains.unwrap().len(), 1);
    }

    #[test]
    fn test_delete_points_body() {
        let body = DeletePoints {
            user_email: "a@asu.edu",
            event: "GBM 1",
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"user_email": "a@asu.edu", "event": "GBM 1"})
        );
    }
}
