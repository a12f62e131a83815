//! Leaderboard rows and per-user points history.
//!
//! Ranks come from the order the points API returns rows in. Totals are
//! whatever the server says; nothing here sums or re-sorts points.

use serde::{Deserialize, Serialize};

use crate::types::{PointsId, UserId};

/// A row of `GET /api/public/{org}/leaderboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub asu_id: Option<String>,
    #[serde(default)]
    pub total_points: f64,
}

impl LeaderboardEntry {
    /// Display name, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Pair each entry with its 1-based rank, preserving server order.
pub fn ranked(entries: &[LeaderboardEntry]) -> impl Iterator<Item = (usize, &LeaderboardEntry)> {
    entries.iter().enumerate().map(|(index, entry)| (index + 1, entry))
}

/// Profile fields of a user as returned with their points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub asu_id: Option<String>,
    #[serde(default)]
    pub academic_standing: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
}

/// One point award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsRecord {
    #[serde(default)]
    pub id: Option<PointsId>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, alias = "awarded_by")]
    pub awarded_by_officer: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl PointsRecord {
    /// When the points were awarded, preferring `timestamp`.
    #[must_use]
    pub fn awarded_at(&self) -> Option<&str> {
        self.timestamp.as_deref().or(self.last_updated.as_deref())
    }
}

/// Body of `GET /api/points/{org}/users/{email}/points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    pub user: UserProfile,
    #[serde(default)]
    pub total_points: f64,
    #[serde(default)]
    pub points_history: Vec<PointsRecord>,
}

impl UserDetail {
    /// Find the history entry for an event name.
    #[must_use]
    pub fn record_for_event(&self, event: &str) -> Option<&PointsRecord> {
        self.points_history
            .iter()
            .find(|r| r.event.as_deref() == Some(event))
    }
}

/// Format a points value, dropping the fraction when it is whole.
///
/// ```
/// use campus_points_core::format_points;
///
/// assert_eq!(format_points(50.0), "50");
/// assert_eq!(format_points(12.5), "12.5");
/// ```
#[must_use]
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 && points.abs() < 1e15 {
        format!("{points:.0}")
    } else {
        let formatted = format!("{points:.2}");
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_preserves_server_order() {
        let entries: Vec<LeaderboardEntry> = serde_json::from_value(serde_json::json!([
            {"email": "a", "total_points": 50},
            {"email": "b", "total_points": 80}
        ]))
        .unwrap();

        let ranks: Vec<(usize, &str)> = ranked(&entries)
            .map(|(rank, e)| (rank, e.email.as_str()))
            .collect();
        assert_eq!(ranks, vec![(1, "a"), (2, "b")]);
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let entry = LeaderboardEntry {
            email: "x@asu.edu".to_string(),
            name: Some("  ".to_string()),
            asu_id: None,
            total_points: 0.0,
        };
        assert_eq!(entry.display_name(), "x@asu.edu");
    }

    #[test]
    fn test_user_detail_tolerates_sparse_history() {
        let detail: UserDetail = serde_json::from_value(serde_json::json!({
            "user": {"id": 4, "name": "Sparky", "email": "s@asu.edu"},
            "total_points": 15.5,
            "points_history": [
                {"id": 1, "points": 10, "last_updated": "2024-09-01T00:00:00"},
                {"event": "GBM", "points": 5.5, "timestamp": "2024-09-02T00:00:00", "awarded_by": "Officer"}
            ]
        }))
        .unwrap();

        assert_eq!(detail.points_history.len(), 2);
        let first = detail.points_history.first().unwrap();
        assert_eq!(first.awarded_at(), Some("2024-09-01T00:00:00"));
        let gbm = detail.record_for_event("GBM").unwrap();
        assert_eq!(gbm.awarded_by_officer.as_deref(), Some("Officer"));
    }

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(0.0), "0");
        assert_eq!(format_points(80.0), "80");
        assert_eq!(format_points(2.25), "2.25");
        assert_eq!(format_points(-3.0), "-3");
    }
}
