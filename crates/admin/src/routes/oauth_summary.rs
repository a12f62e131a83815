//! OAuth configuration summary across all organizations (superadmin).

use std::collections::BTreeSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
};
use tracing::instrument;

use campus_points_core::{Flash, OrgId};

use crate::api::{OAuthSummary, OrgOAuthDetail};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::AdminSession;
use crate::state::AppState;

const SUMMARY_PATH: &str = "/superadmin/oauth/summary";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(SUMMARY_PATH, get(show))
        .route("/superadmin/oauth/summary/refresh", post(refresh))
        .route("/superadmin/oauth/summary/toggle/{org_id}", post(toggle))
}

/// One organization row of the summary table.
pub struct OrgRow {
    pub id: i32,
    pub name: String,
    pub prefix: String,
    pub oauth_enabled: bool,
    pub callback_url: Option<String>,
    pub domains: Vec<String>,
    pub storefront_enabled: bool,
    pub is_active: bool,
    pub expanded: bool,
}

impl OrgRow {
    fn new(detail: &OrgOAuthDetail, expanded: &BTreeSet<OrgId>) -> Self {
        Self {
            id: detail.id.as_i32(),
            name: detail.name.clone(),
            prefix: detail.prefix.clone(),
            oauth_enabled: detail.oauth_enabled,
            callback_url: detail.oauth_callback_url.clone().filter(|u| !u.is_empty()),
            domains: detail.allowed_domains.clone().unwrap_or_default(),
            storefront_enabled: detail.storefront_enabled,
            is_active: detail.is_active,
            expanded: expanded.contains(&detail.id),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "oauth/summary.html")]
pub struct OAuthSummaryTemplate {
    pub flash: Option<Flash>,
    pub summary: Option<OAuthSummary>,
    pub rows: Vec<OrgRow>,
}

async fn render(session: &AdminSession, summary: Option<OAuthSummary>) -> Result<OAuthSummaryTemplate> {
    let expanded = session.expanded_orgs().await?;
    let rows = summary
        .as_ref()
        .map(|s| {
            s.organizations_details
                .iter()
                .map(|d| OrgRow::new(d, &expanded))
                .collect()
        })
        .unwrap_or_default();
    Ok(OAuthSummaryTemplate {
        flash: session.take_flash().await?,
        summary,
        rows,
    })
}

/// Fetch the summary and remember it for row toggles.
async fn fetch(state: &AppState, session: &AdminSession) -> Result<Option<OAuthSummary>> {
    match state.api().oauth_summary().await {
        Ok(summary) => {
            session.cache_summary(&summary).await?;
            Ok(Some(summary))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load OAuth summary");
            session.flash(Flash::error("Failed to load OAuth summary")).await?;
            Ok(None)
        }
    }
}

#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: AdminSession) -> Result<OAuthSummaryTemplate> {
    let summary = fetch(&state, &session).await?;
    render(&session, summary).await
}

pub async fn refresh() -> Redirect {
    Redirect::to(SUMMARY_PATH)
}

/// Expand or collapse one organization, rendering from the cached summary.
#[instrument(skip(state, session))]
pub async fn toggle(
    State(state): State<AppState>,
    session: AdminSession,
    Path(org_id): Path<String>,
) -> Result<OAuthSummaryTemplate> {
    let org_id: OrgId = org_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid organization id: {org_id}")))?;
    session.toggle_expanded(org_id).await?;

    let summary = match session.cached_summary().await? {
        Some(cached) => Some(cached),
        None => fetch(&state, &session).await?,
    };
    render(&session, summary).await
}
