//! Organization leaderboard with the user detail modal.
//!
//! The modal is addressed by query string: `?user=<email>` opens it,
//! `&mode=edit` switches it to the edit form and `&confirm=<event>` asks
//! before deleting a points entry. Cancel links just drop the parameter, so
//! backing out of a delete never touches the API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use campus_points_core::{
    Flash, LeaderboardEntry, OrgPrefix, UserDetail, UserUpdate, display_date, format_points,
    non_blank, ranked,
};

use crate::error::Result;
use crate::filters;
use crate::models::AdminSession;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orgs/{org}/leaderboard", get(show))
        .route("/orgs/{org}/leaderboard/users/{email}", post(save_user))
        .route(
            "/orgs/{org}/leaderboard/users/{email}/points/delete",
            post(delete_points),
        )
}

// =============================================================================
// Modal State
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub user: Option<String>,
    pub mode: Option<String>,
    pub confirm: Option<String>,
}

/// What the detail modal is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalView {
    Viewing,
    Editing,
    ConfirmingDelete(String),
}

impl ModalView {
    #[must_use]
    pub fn from_query(query: &LeaderboardQuery) -> Self {
        if let Some(event) = query.confirm.as_deref().filter(|e| !e.is_empty()) {
            return Self::ConfirmingDelete(event.to_string());
        }
        if query.mode.as_deref() == Some("edit") {
            Self::Editing
        } else {
            Self::Viewing
        }
    }
}

/// URL of the leaderboard, optionally with a user's modal open.
#[must_use]
pub fn leaderboard_url(org: &OrgPrefix, user: Option<&str>, edit: bool) -> String {
    match user {
        None => format!("/orgs/{org}/leaderboard"),
        Some(email) => {
            let mut url = format!(
                "/orgs/{org}/leaderboard?user={}",
                urlencoding::encode(email)
            );
            if edit {
                url.push_str("&mode=edit");
            }
            url
        }
    }
}

// =============================================================================
// View Models
// =============================================================================

pub struct RowView {
    pub rank: usize,
    pub email: String,
    /// Email encoded for query strings and paths.
    pub email_param: String,
    pub name: String,
    pub asu_id: String,
    pub points: String,
    pub selected: bool,
}

impl RowView {
    fn new(rank: usize, entry: &LeaderboardEntry, selected: Option<&str>) -> Self {
        Self {
            rank,
            email: entry.email.clone(),
            email_param: urlencoding::encode(&entry.email).into_owned(),
            name: entry.display_name().to_string(),
            asu_id: entry.asu_id.clone().unwrap_or_default(),
            points: format_points(entry.total_points),
            selected: selected == Some(entry.email.as_str()),
        }
    }
}

pub struct HistoryView {
    /// `None` for entries recorded without an event; those cannot be deleted.
    pub event: Option<String>,
    pub event_param: Option<String>,
    pub points: String,
    pub awarded_at: String,
    pub awarded_by: String,
}

pub struct ModalData {
    pub email: String,
    pub email_param: String,
    pub name: String,
    pub username: String,
    pub asu_id: String,
    pub academic_standing: String,
    pub major: String,
    pub total_points: String,
    pub history: Vec<HistoryView>,
    pub editing: bool,
    /// Event awaiting delete confirmation.
    pub confirm_event: Option<String>,
}

impl ModalData {
    fn new(email: &str, detail: &UserDetail, view: &ModalView) -> Self {
        let user = &detail.user;
        Self {
            email: email.to_string(),
            email_param: urlencoding::encode(email).into_owned(),
            name: user.name.clone().unwrap_or_default(),
            username: user.username.clone().unwrap_or_default(),
            asu_id: user.asu_id.clone().unwrap_or_default(),
            academic_standing: user.academic_standing.clone().unwrap_or_default(),
            major: user.major.clone().unwrap_or_default(),
            total_points: format_points(detail.total_points),
            history: detail
                .points_history
                .iter()
                .map(|r| {
                    let event = r.event.as_deref().and_then(non_blank);
                    HistoryView {
                        event_param: event
                            .as_deref()
                            .map(|e| urlencoding::encode(e).into_owned()),
                        event,
                        points: format_points(r.points),
                        awarded_at: r.awarded_at().map(display_date).unwrap_or_default(),
                        awarded_by: r.awarded_by_officer.clone().unwrap_or_default(),
                    }
                })
                .collect(),
            editing: *view == ModalView::Editing,
            confirm_event: match view {
                ModalView::ConfirmingDelete(event) => Some(event.clone()),
                _ => None,
            },
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "leaderboard.html")]
pub struct LeaderboardTemplate {
    pub org: String,
    pub flash: Option<Flash>,
    pub rows: Vec<RowView>,
    pub error: Option<String>,
    /// Email whose modal is open.
    pub modal_user: Option<String>,
    pub modal: Option<ModalData>,
    pub modal_error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

#[instrument(skip(state, session, query), fields(org = %org))]
pub async fn show(
    State(state): State<AppState>,
    Path(org): Path<OrgPrefix>,
    Query(query): Query<LeaderboardQuery>,
    session: AdminSession,
) -> Result<LeaderboardTemplate> {
    let selected = query.user.as_deref().filter(|u| !u.is_empty());

    let (rows, error) = match state.api().leaderboard(&org).await {
        Ok(entries) => (
            ranked(&entries)
                .map(|(rank, entry)| RowView::new(rank, entry, selected))
                .collect(),
            None,
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch leaderboard");
            (Vec::new(), Some("Failed to fetch leaderboard data".to_string()))
        }
    };

    let (modal, modal_error) = match selected {
        None => (None, None),
        Some(email) => match state.api().user_detail(&org, email).await {
            Ok(detail) => (
                Some(ModalData::new(email, &detail, &ModalView::from_query(&query))),
                None,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch user details");
                (None, Some(e.user_message("Failed to fetch user details")))
            }
        },
    };

    Ok(LeaderboardTemplate {
        org: org.to_string(),
        flash: session.take_flash().await?,
        rows,
        error,
        modal_user: selected.map(String::from),
        modal,
        modal_error,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct EditUserForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub asu_id: String,
    #[serde(default)]
    pub academic_standing: String,
    #[serde(default)]
    pub major: String,
}

impl From<EditUserForm> for UserUpdate {
    fn from(form: EditUserForm) -> Self {
        Self {
            name: form.name.trim().to_string(),
            username: Some(form.username.trim().to_string()),
            asu_id: form.asu_id.trim().to_string(),
            academic_standing: form.academic_standing.trim().to_string(),
            major: form.major.trim().to_string(),
        }
    }
}

/// Save the edit form. The email in the path is never changed.
#[instrument(skip(state, session, form), fields(org = %org))]
pub async fn save_user(
    State(state): State<AppState>,
    Path((org, email)): Path<(OrgPrefix, String)>,
    session: AdminSession,
    Form(form): Form<EditUserForm>,
) -> Result<Redirect> {
    let update = UserUpdate::from(form);
    match state.api().update_user(&org, &email, &update).await {
        Ok(_) => {
            tracing::info!("user information updated");
            session
                .flash(Flash::success("User information updated"))
                .await?;
            Ok(Redirect::to(&leaderboard_url(&org, Some(&email), false)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to update user information");
            session
                .flash(Flash::error(
                    e.user_message("Failed to update user information"),
                ))
                .await?;
            Ok(Redirect::to(&leaderboard_url(&org, Some(&email), true)))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeletePointsForm {
    pub event: String,
}

/// Delete a confirmed points entry, then reopen the modal.
#[instrument(skip(state, session), fields(org = %org))]
pub async fn delete_points(
    State(state): State<AppState>,
    Path((org, email)): Path<(OrgPrefix, String)>,
    session: AdminSession,
    Form(form): Form<DeletePointsForm>,
) -> Result<Redirect> {
    let flash = match non_blank(&form.event) {
        None => Flash::error("Error deleting points"),
        Some(event) => match state.api().delete_points(&org, &email, &event).await {
            Ok(response) => {
                tracing::info!(%event, "points entry deleted");
                Flash::success(
                    response
                        .message
                        .unwrap_or_else(|| format!("Deleted points for {event}")),
                )
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to delete points");
                Flash::error(e.user_message("Error deleting points"))
            }
        },
    };
    session.flash(flash).await?;
    Ok(Redirect::to(&leaderboard_url(&org, Some(&email), false)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_view_from_query() {
        let query = LeaderboardQuery {
            user: Some("a@asu.edu".to_string()),
            mode: Some("edit".to_string()),
            confirm: None,
        };
        assert_eq!(ModalView::from_query(&query), ModalView::Editing);

        let query = LeaderboardQuery {
            confirm: Some("GBM 1".to_string()),
            ..query
        };
        assert_eq!(
            ModalView::from_query(&query),
            ModalView::ConfirmingDelete("GBM 1".to_string())
        );

        assert_eq!(
            ModalView::from_query(&LeaderboardQuery::default()),
            ModalView::Viewing
        );
    }

    #[test]
    fn test_history_without_event_is_not_deletable() {
        let detail: UserDetail = serde_json::from_value(serde_json::json!({
            "user": {"name": "Ada", "email": "a@asu.edu"},
            "total_points": 35.0,
            "points_history": [
                {"id": 1, "event": "GBM 1", "points": 30.0},
                {"id": 2, "event": "  ", "points": 5.0}
            ]
        }))
        .unwrap();

        let modal = ModalData::new("a@asu.edu", &detail, &ModalView::Viewing);
        assert_eq!(modal.history[0].event_param.as_deref(), Some("GBM%201"));
        assert_eq!(modal.history[1].event, None);
        assert_eq!(modal.history[1].event_param, None);
    }

    #[test]
    fn test_leaderboard_url_encodes_email() {
        let org = OrgPrefix::parse("acm").unwrap();
        assert_eq!(leaderboard_url(&org, None, false), "/orgs/acm/leaderboard");
        assert_eq!(
            leaderboard_url(&org, Some("a+b@asu.edu"), true),
            "/orgs/acm/leaderboard?user=a%2Bb%40asu.edu&mode=edit"
        );
    }

    #[test]
    fn test_rank_follows_server_order() {
        let entries = vec![
            LeaderboardEntry {
                email: "a@asu.edu".to_string(),
                name: Some("A".to_string()),
                asu_id: None,
                total_points: 50.0,
            },
            LeaderboardEntry {
                email: "b@asu.edu".to_string(),
                name: None,
                asu_id: None,
                total_points: 80.0,
            },
        ];
        let rows: Vec<RowView> = ranked(&entries)
            .map(|(rank, e)| RowView::new(rank, e, Some("b@asu.edu")))
            .collect();
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].email, "a@asu.edu");
        assert_eq!(rows[1].name, "b@asu.edu");
        assert!(rows[1].selected);
    }

    #[test]
    fn test_edit_form_sends_username() {
        let update = UserUpdate::from(EditUserForm {
            name: " Sparky ".to_string(),
            ..EditUserForm::default()
        });
        assert_eq!(update.name, "Sparky");
        assert_eq!(update.username.as_deref(), Some(""));
    }
}
