//! `cpts leaderboard <org>`.

use campus_points_admin::api::AdminClient;
use campus_points_core::{LeaderboardEntry, OrgPrefix, format_points, ranked};

use super::CliError;

/// Fetch and format an organization's leaderboard.
///
/// # Errors
///
/// Returns `CliError::Api` if the leaderboard cannot be fetched.
pub async fn run(
    client: &AdminClient,
    org: &OrgPrefix,
    limit: Option<usize>,
) -> Result<String, CliError> {
    let entries = client.leaderboard(org).await?;
    tracing::info!(%org, count = entries.len(), "fetched leaderboard");
    Ok(render(org, &entries, limit))
}

/// Format leaderboard rows in server order.
#[must_use]
pub fn render(org: &OrgPrefix, entries: &[LeaderboardEntry], limit: Option<usize>) -> String {
    if entries.is_empty() {
        return format!("No points recorded for {org}.\n");
    }

    let name_width = entries
        .iter()
        .map(|e| e.display_name().chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = format!("{:>5}  {:<name_width$}  {:>10}  Email\n", "Rank", "Name", "Points");
    for (rank, entry) in ranked(entries).take(limit.unwrap_or(usize::MAX)) {
        out.push_str(&format!(
            "{:>5}  {:<name_width$}  {:>10}  {}\n",
            format!("#{rank}"),
            entry.display_name(),
            format_points(entry.total_points),
            entry.email,
        ));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn entry(email: &str, name: Option<&str>, points: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            email: email.to_string(),
            name: name.map(String::from),
            asu_id: None,
            total_points: points,
        }
    }

    #[test]
    fn test_render_keeps_server_order() {
        let org = OrgPrefix::parse("acm").unwrap();
        let out = render(
            &org,
            &[entry("a@asu.edu", Some("Ada"), 50.0), entry("b@asu.edu", None, 80.0)],
            None,
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("#1") && lines[1].contains("a@asu.edu"));
        assert!(lines[2].contains("#2") && lines[2].contains("b@asu.edu"));
    }

    #[test]
    fn test_render_limit_and_empty() {
        let org = OrgPrefix::parse("acm").unwrap();
        let out = render(
            &org,
            &[entry("a@asu.edu", None, 5.0), entry("b@asu.edu", None, 3.0)],
            Some(1),
        );
        assert_eq!(out.lines().count(), 2);
        assert_eq!(render(&org, &[], None), "No points recorded for acm.\n");
    }
}
