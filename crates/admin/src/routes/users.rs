//! Find, update and create users of an organization.
//!
//! The update form is bound to the email captured by the last search (a
//! hidden `current_email` field), not to whatever is in the search box.

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

use campus_points_core::{Email, Flash, NewUser, OrgPrefix, UserUpdate, non_blank};

use crate::error::Result;
use crate::filters;
use crate::models::AdminSession;
use crate::state::AppState;

const NOT_FOUND_MESSAGE: &str = "User not found. You can create this user or update their details if they exist under a different email.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orgs/{org}/users", get(find))
        .route("/orgs/{org}/users/update", post(update))
        .route("/orgs/{org}/users/create", post(create))
}

fn users_url(org: &OrgPrefix, email: Option<&str>) -> String {
    match email {
        Some(email) => format!("/orgs/{org}/users?email={}", urlencoding::encode(email)),
        None => format!("/orgs/{org}/users"),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Values of the shared profile fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub name: String,
    pub asu_id: String,
    pub academic_standing: String,
    pub major: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub org: String,
    pub flash: Option<Flash>,
    pub search_email: String,
    /// Result of the search, shown above the update form.
    pub lookup: Option<Flash>,
    /// Email the update form writes to; `None` hides the form.
    pub current_email: Option<String>,
    pub fields: ProfileFields,
}

#[derive(Debug, Default, Deserialize)]
pub struct FindQuery {
    pub email: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

#[instrument(skip(state, session, query), fields(org = %org))]
pub async fn find(
    State(state): State<AppState>,
    Path(org): Path<OrgPrefix>,
    Query(query): Query<FindQuery>,
    session: AdminSession,
) -> Result<UsersTemplate> {
    let mut page = UsersTemplate {
        org: org.to_string(),
        flash: session.take_flash().await?,
        search_email: query.email.clone().unwrap_or_default(),
        lookup: None,
        current_email: None,
        fields: ProfileFields::default(),
    };

    let Some(raw) = query.email else {
        return Ok(page);
    };
    let Some(email) = non_blank(&raw) else {
        page.lookup = Some(Flash::error("Please enter an email to search."));
        return Ok(page);
    };

    match state.api().user_detail(&org, &email).await {
        Ok(detail) => {
            let user = detail.user;
            page.fields = ProfileFields {
                name: user.name.unwrap_or_default(),
                asu_id: user.asu_id.unwrap_or_default(),
                academic_standing: user.academic_standing.unwrap_or_default(),
                major: user.major.unwrap_or_default(),
            };
            page.current_email = Some(email);
        }
        Err(e) if e.is_not_found() => {
            tracing::info!("user not found, offering blank form");
            page.lookup = Some(Flash::info(NOT_FOUND_MESSAGE));
            page.current_email = Some(email);
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to fetch user");
            page.lookup = Some(Flash::error(e.user_message("Error fetching user.")));
        }
    }
    Ok(page)
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserForm {
    #[serde(default)]
    pub current_email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub asu_id: String,
    #[serde(default)]
    pub academic_standing: String,
    #[serde(default)]
    pub major: String,
}

#[instrument(skip(state, session, form), fields(org = %org))]
pub async fn update(
    State(state): State<AppState>,
    Path(org): Path<OrgPrefix>,
    session: AdminSession,
    Form(form): Form<UpdateUserForm>,
) -> Result<Redirect> {
    let Some(email) = non_blank(&form.current_email) else {
        session
            .flash(Flash::error("No user selected or email specified for update."))
            .await?;
        return Ok(Redirect::to(&users_url(&org, None)));
    };

    let update = UserUpdate {
        name: form.name.trim().to_string(),
        username: None,
        asu_id: form.asu_id.trim().to_string(),
        academic_standing: form.academic_standing.trim().to_string(),
        major: form.major.trim().to_string(),
    };

    let flash = match state.api().update_user(&org, &email, &update).await {
        Ok(response) => Flash::success(
            response
                .message
                .unwrap_or_else(|| "User updated successfully!".to_string()),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "failed to update user");
            Flash::error(e.user_message("Error updating user."))
        }
    };
    session.flash(flash).await?;
    Ok(Redirect::to(&users_url(&org, Some(&email))))
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub asu_id: String,
    #[serde(default)]
    pub academic_standing: String,
    #[serde(default)]
    pub major: String,
}

impl CreateUserForm {
    /// Both email and name are required; the email must also parse.
    fn to_new_user(&self) -> std::result::Result<NewUser, String> {
        let (Some(email), Some(name)) = (non_blank(&self.email), non_blank(&self.name)) else {
            return Err("Email and name are required for creating a user.".to_string());
        };
        let email = Email::parse(&email).map_err(|e| format!("Invalid email address: {e}"))?;
        Ok(NewUser {
            email,
            name,
            asu_id: non_blank(&self.asu_id),
            academic_standing: non_blank(&self.academic_standing),
            major: non_blank(&self.major),
        })
    }
}

#[instrument(skip(state, session, form), fields(org = %org))]
pub async fn create(
    State(state): State<AppState>,
    Path(org): Path<OrgPrefix>,
    session: AdminSession,
    Form(form): Form<CreateUserForm>,
) -> Result<Redirect> {
    let user = match form.to_new_user() {
        Ok(user) => user,
        Err(message) => {
            session.flash(Flash::error(message)).await?;
            return Ok(Redirect::to(&users_url(&org, None)));
        }
    };

    let flash = match state.api().create_user(&org, &user).await {
        Ok(response) => {
            tracing::info!("user created");
            Flash::success(
                response
                    .message
                    .unwrap_or_else(|| "User created successfully!".to_string()),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to create user");
            Flash::error(e.user_message("Error creating user."))
        }
    };
    session.flash(flash).await?;
    Ok(Redirect::to(&users_url(&org, None)))
}
