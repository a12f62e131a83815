//! Admin session state.
//!
//! The console keeps flash notices and the OAuth summary view state here: the
//! last fetched summary (so expanding a row re-renders without a fetch) and
//! the set of expanded organization rows.

use std::collections::BTreeSet;

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use tower_sessions::Session;

use campus_points_core::{Flash, OrgId};

use crate::api::OAuthSummary;

/// Session keys for admin view state.
pub mod keys {
    /// Pending flash notice.
    pub const FLASH: &str = "flash";

    /// Last fetched OAuth summary.
    pub const OAUTH_SUMMARY: &str = "oauth_summary";

    /// Organization ids whose summary rows are expanded.
    pub const OAUTH_EXPANDED: &str = "oauth_expanded";
}

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Typed access to an admin's session.
#[derive(Debug, Clone)]
pub struct AdminSession {
    session: Session,
}

impl AdminSession {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn flash(&self, flash: Flash) -> SessionResult<()> {
        self.session.insert(keys::FLASH, flash).await
    }

    /// Take the pending notice; it is shown once.
    pub async fn take_flash(&self) -> SessionResult<Option<Flash>> {
        self.session.remove::<Flash>(keys::FLASH).await
    }

    pub async fn cached_summary(&self) -> SessionResult<Option<OAuthSummary>> {
        self.session.get(keys::OAUTH_SUMMARY).await
    }

    pub async fn cache_summary(&self, summary: &OAuthSummary) -> SessionResult<()> {
        self.session.insert(keys::OAUTH_SUMMARY, summary).await
    }

    pub async fn expanded_orgs(&self) -> SessionResult<BTreeSet<OrgId>> {
        Ok(self
            .session
            .get(keys::OAUTH_EXPANDED)
            .await?
            .unwrap_or_default())
    }

    /// Flip one summary row. Returns whether it is now expanded.
    pub async fn toggle_expanded(&self, org_id: OrgId) -> SessionResult<bool> {
        let mut expanded = self.expanded_orgs().await?;
        let now_expanded = if expanded.remove(&org_id) {
            false
        } else {
            expanded.insert(org_id);
            true
        };
        self.session.insert(keys::OAUTH_EXPANDED, expanded).await?;
        Ok(now_expanded)
    }
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self::new(session))
    }
}
