//! Per-organization OAuth settings editor (superadmin).
//!
//! The whole draft travels in the form: the enable flag, callback URL and the
//! newline-joined domain list. Adding or removing a domain re-renders the
//! draft without touching the API; only save and test make requests.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use campus_points_core::{DomainAdd, DomainSet, Flash, OrgId};

use crate::api::{OAuthSettings, OAuthTestReport, OrganizationInfo};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/superadmin/organizations/{id}/oauth",
        get(show).post(submit),
    )
}

// =============================================================================
// Form
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct OAuthForm {
    #[serde(default)]
    pub oauth_enabled: bool,
    #[serde(default)]
    pub oauth_callback_url: String,
    /// Current domains, one per line.
    #[serde(default)]
    pub allowed_domains: String,
    #[serde(default)]
    pub new_domain: String,
    pub action: String,
}

/// What the submitted button asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthAction {
    Add,
    Remove(String),
    Save,
    Test,
}

impl OAuthAction {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "add" => Some(Self::Add),
            "save" => Some(Self::Save),
            "test" => Some(Self::Test),
            other => other
                .strip_prefix("remove:")
                .map(|domain| Self::Remove(domain.to_string())),
        }
    }
}

impl OAuthForm {
    fn draft(&self) -> OAuthSettings {
        OAuthSettings {
            oauth_enabled: self.oauth_enabled,
            oauth_callback_url: self.oauth_callback_url.trim().to_string(),
            allowed_domains: DomainSet::from_lines(&self.allowed_domains),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "oauth/manager.html")]
pub struct OAuthManagerTemplate {
    pub org_id: i32,
    pub org_name: String,
    pub flash: Option<Flash>,
    pub oauth_enabled: bool,
    pub callback_url: String,
    pub domains: Vec<String>,
    pub domain_lines: String,
    pub new_domain: String,
    pub saved: Option<OrganizationInfo>,
    pub report: Option<OAuthTestReport>,
}

impl OAuthManagerTemplate {
    fn new(org_id: OrgId, settings: &OAuthSettings, flash: Option<Flash>) -> Self {
        Self {
            org_id: org_id.as_i32(),
            org_name: format!("Organization #{org_id}"),
            flash,
            oauth_enabled: settings.oauth_enabled,
            callback_url: settings.oauth_callback_url.clone(),
            domains: settings.allowed_domains.iter().map(String::from).collect(),
            domain_lines: settings.allowed_domains.to_lines(),
            new_domain: String::new(),
            saved: None,
            report: None,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn parse_org_id(raw: &str) -> Result<OrgId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid organization id: {raw}")))
}

/// Load the stored settings. Failure shows the defaults.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<OAuthManagerTemplate> {
    let org_id = parse_org_id(&id)?;
    let (settings, flash) = match state.api().oauth_settings(org_id).await {
        Ok(settings) => (settings, None),
        Err(e) => {
            tracing::error!(error = %e, "failed to load OAuth settings");
            (
                OAuthSettings::default(),
                Some(Flash::error("Failed to load OAuth settings")),
            )
        }
    };
    Ok(OAuthManagerTemplate::new(org_id, &settings, flash))
}

#[instrument(skip(state, form), fields(action = %form.action))]
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<OAuthForm>,
) -> Result<OAuthManagerTemplate> {
    let org_id = parse_org_id(&id)?;
    let action = OAuthAction::parse(&form.action)
        .ok_or_else(|| AppError::BadRequest(format!("unknown action: {}", form.action)))?;
    let mut draft = form.draft();

    match action {
        OAuthAction::Add => {
            let added = draft.allowed_domains.add(&form.new_domain);
            let mut page = OAuthManagerTemplate::new(org_id, &draft, None);
            if added != DomainAdd::Added {
                page.new_domain = form.new_domain;
            }
            Ok(page)
        }
        OAuthAction::Remove(domain) => {
            draft.allowed_domains.remove(&domain);
            let mut page = OAuthManagerTemplate::new(org_id, &draft, None);
            page.new_domain = form.new_domain;
            Ok(page)
        }
        OAuthAction::Save => match state.api().save_oauth_settings(org_id, &draft).await {
            Ok(saved) => {
                tracing::info!(org = %saved.organization.prefix, "OAuth settings saved");
                let message = saved
                    .message
                    .clone()
                    .unwrap_or_else(|| "OAuth settings saved successfully".to_string());
                let mut page = OAuthManagerTemplate::new(org_id, &draft, Some(Flash::success(message)));
                page.org_name.clone_from(&saved.organization.name);
                page.saved = Some(saved.organization);
                Ok(page)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to save OAuth settings");
                let mut page = OAuthManagerTemplate::new(
                    org_id,
                    &draft,
                    Some(Flash::error(format!(
                        "Failed to save OAuth settings: {}",
                        e.detail()
                    ))),
                );
                page.new_domain = form.new_domain;
                Ok(page)
            }
        },
        OAuthAction::Test => {
            let mut page = OAuthManagerTemplate::new(org_id, &draft, None);
            page.new_domain = form.new_domain;
            match state.api().test_oauth(org_id).await {
                Ok(report) => {
                    page.org_name.clone_from(&report.organization);
                    page.report = Some(report);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "OAuth configuration test failed");
                    page.flash = Some(Flash::error("Failed to test OAuth configuration"));
                }
            }
            Ok(page)
        }
    }
}
