//! `cpts oauth-summary`.

use campus_points_admin::api::{AdminClient, OAuthSummary};

use super::CliError;

/// Fetch and format the OAuth summary.
///
/// # Errors
///
/// Returns `CliError::Api` if the summary cannot be fetched.
pub async fn run(client: &AdminClient, details: bool) -> Result<String, CliError> {
    let summary = client.oauth_summary().await?;
    Ok(render(&summary, details))
}

#[must_use]
pub fn render(summary: &OAuthSummary, details: bool) -> String {
    let mut out = format!(
        "Organizations:       {}\n\
         OAuth enabled:       {}\n\
         Fully configured:    {}\n\
         With domains:        {}\n\
         With callback URL:   {}\n",
        summary.total_organizations,
        summary.oauth_enabled_count,
        summary.oauth_configured_count,
        summary.organizations_with_domains,
        summary.organizations_with_callbacks,
    );

    for org in &summary.organizations_details {
        out.push_str(&format!(
            "\n[{}] {} ({}) oauth={} storefront={} active={}\n",
            org.id,
            org.name,
            org.prefix,
            on_off(org.oauth_enabled),
            on_off(org.storefront_enabled),
            on_off(org.is_active),
        ));
        if details {
            let callback = org
                .oauth_callback_url
                .as_deref()
                .filter(|u| !u.is_empty())
                .unwrap_or("-");
            out.push_str(&format!("    callback: {callback}\n"));
            let domains = org.allowed_domains.as_deref().unwrap_or_default();
            if domains.is_empty() {
                out.push_str("    domains:  -\n");
            } else {
                out.push_str(&format!("    domains:  {}\n", domains.join(", ")));
            }
        }
    }
    out
}

const fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}
