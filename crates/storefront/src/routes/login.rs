//! Member login, OAuth hand-off and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use campus_points_core::{Flash, OrgPrefix, non_blank};

use crate::api::MemberLoginRequest;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::models::MemberSession;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Member login form data. Every field is echoed back on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub asu_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub academic_standing: String,
    #[serde(default)]
    pub major: String,
}

impl LoginForm {
    fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.asu_id.trim().is_empty()
    }

    fn to_request(&self) -> MemberLoginRequest {
        MemberLoginRequest {
            name: self.name.trim().to_string(),
            asu_id: self.asu_id.trim().to_string(),
            username: non_blank(&self.username),
            email: non_blank(&self.email),
            academic_standing: non_blank(&self.academic_standing),
            major: non_blank(&self.major),
        }
    }
}

/// Where the organization OAuth flow sends members back to.
pub const OAUTH_RETURN_PATH: &str = "/store/auth/return";

/// The OAuth entry URL with the storefront's return URL as `next`.
fn oauth_entry_url(entry: &str, base_url: &str) -> String {
    let next = format!("{}{OAUTH_RETURN_PATH}", base_url.trim_end_matches('/'));
    let separator = if entry.contains('?') { '&' } else { '?' };
    format!("{entry}{separator}next={}", urlencoding::encode(&next))
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub org: String,
    pub form: LoginForm,
    pub flash: Option<Flash>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the member login form.
#[instrument(skip(session))]
pub async fn login_page(Path(org): Path<OrgPrefix>, session: MemberSession) -> Result<Response> {
    let flash = session.take_flash().await?;
    Ok(LoginTemplate {
        org: org.to_string(),
        form: LoginForm::default(),
        flash,
    }
    .into_response())
}

/// Submit the member login form.
#[instrument(skip(state, session, form), fields(org = %org))]
pub async fn login(
    State(state): State<AppState>,
    Path(org): Path<OrgPrefix>,
    session: MemberSession,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if !form.is_complete() {
        return Ok(LoginTemplate {
            org: org.to_string(),
            form,
            flash: Some(Flash::error("Name and ASU ID are required")),
        }
        .into_response());
    }

    match state.api().member_login(&org, &form.to_request()).await {
        Ok(response) => {
            session
                .set_identity(&response.user, &response.organization)
                .await?;
            set_sentry_user(&response.user.id, response.user.email.as_deref());
            tracing::info!(user_id = %response.user.id, "member logged in");
            session.flash(Flash::success("Login successful!")).await?;
            Ok(Redirect::to(&format!("/store/{org}")).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "member login failed");
            Ok(LoginTemplate {
                org: org.to_string(),
                form,
                flash: Some(Flash::error(
                    e.user_message("Login failed. Please try again."),
                )),
            }
            .into_response())
        }
    }
}

/// Hand off to the organization OAuth flow.
///
/// The organization is stashed in the session; [`oauth_return`] takes it
/// back out once the flow finishes.
#[instrument(skip(state, session))]
pub async fn oauth_login(
    State(state): State<AppState>,
    Path(org): Path<OrgPrefix>,
    session: MemberSession,
) -> Result<Redirect> {
    session.set_pending_org(&org).await?;
    let config = state.config();
    Ok(Redirect::to(&oauth_entry_url(
        &config.oauth_entry_url,
        &config.base_url,
    )))
}

/// Resume at the store the member started the OAuth flow from.
#[instrument(skip(session))]
pub async fn oauth_return(session: MemberSession) -> Result<Redirect> {
    let pending = session
        .take_pending_org()
        .await?
        .ok_or_else(|| AppError::BadRequest("no organization sign-in in progress".to_string()))?;
    let org = OrgPrefix::parse(&pending).map_err(|e| AppError::BadRequest(e.to_string()))?;
    tracing::info!(org = %org, "returned from organization sign-in");
    Ok(Redirect::to(&format!("/store/{org}")))
}

/// Log the member out of this organization's store.
#[instrument(skip(session))]
pub async fn logout(Path(org): Path<OrgPrefix>, session: MemberSession) -> Result<Redirect> {
    session.logout(&org).await?;
    clear_sentry_user();
    session.flash(Flash::success("Logged out successfully")).await?;
    Ok(Redirect::to(&format!("/store/{org}")))
}
