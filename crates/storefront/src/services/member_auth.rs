//! Member authentication reconciliation.
//!
//! A store page load decides how the browser is authenticated for an
//! organization, in order:
//!
//! 1. Form login: the session holds a member identity for this organization
//!    and the API accepts its `X-Member-User-Id`.
//! 2. Provider session: the browser carries OAuth provider cookies and the API
//!    accepts them.
//! 3. Anonymous browsing.
//!
//! The member orders endpoint is the auth check; its response is kept so the
//! orders tab does not need a second call. The outcome is recorded in the
//! session so later actions (add to cart, checkout) authenticate the same way.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

use campus_points_core::{Order, OrgPrefix};

use crate::api::{MemberAuth, PointsClient};
use crate::middleware::session::SESSION_COOKIE_NAME;
use crate::models::{MemberIdentity, MemberSession, StoreAuth};

/// Result of auth reconciliation for one page load.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub auth: StoreAuth,
    /// Orders returned by the successful check (empty when anonymous).
    pub orders: Vec<Order>,
}

/// The browser's `Cookie` header without the storefront's own session cookie.
///
/// Returns `None` when nothing is left to forward.
#[must_use]
pub fn provider_cookies(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            pair.split_once('=')
                .map_or(*pair, |(name, _)| name.trim())
                != SESSION_COOKIE_NAME
        })
        .collect::<Vec<_>>()
        .join("; ");

    (!forwarded.is_empty()).then_some(forwarded)
}

/// Identity for `org`, if the member logged in to that organization.
fn identity_for<'a>(
    identity: Option<&'a MemberIdentity>,
    org: &OrgPrefix,
) -> Option<&'a MemberIdentity> {
    identity.filter(|id| id.org.prefix == *org)
}

/// Run auth reconciliation and record the outcome in the session.
///
/// # Errors
///
/// Only session store failures are returned; API failures fall through to
/// the next strategy.
pub async fn reconcile(
    api: &PointsClient,
    session: &MemberSession,
    org: &OrgPrefix,
    cookies: Option<&str>,
) -> Result<Reconciled, tower_sessions::session::Error> {
    let identity = session.identity().await?;

    let mut outcome = Reconciled {
        auth: StoreAuth::Anonymous,
        orders: Vec::new(),
    };

    if let Some(member) = identity_for(identity.as_ref(), org) {
        match api
            .member_orders(org, MemberAuth::Member(member.user.id))
            .await
        {
            Ok(orders) => {
                outcome = Reconciled {
                    auth: StoreAuth::Member,
                    orders,
                };
            }
            Err(e) => tracing::info!(error = %e, "member session rejected"),
        }
    }

    if outcome.auth == StoreAuth::Anonymous
        && let Some(cookies) = cookies
    {
        match api.member_orders(org, MemberAuth::Provider(cookies)).await {
            Ok(orders) => {
                outcome = Reconciled {
                    auth: StoreAuth::Provider,
                    orders,
                };
            }
            Err(e) => tracing::debug!(error = %e, "no provider session"),
        }
    }

    tracing::debug!(auth = ?outcome.auth, "store auth reconciled");
    session.set_store_auth(org, outcome.auth).await?;
    Ok(outcome)
}

/// How to authenticate an action for `org`, based on the last reconciliation.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn request_auth<'a>(
    session: &MemberSession,
    org: &OrgPrefix,
    cookies: Option<&'a str>,
) -> Result<MemberAuth<'a>, tower_sessions::session::Error> {
    let auth = match session.store_auth(org).await? {
        StoreAuth::Member => session
            .identity()
            .await?
            .filter(|id| id.org.prefix == *org)
            .map_or(MemberAuth::Anonymous, |id| MemberAuth::Member(id.user.id)),
        StoreAuth::Provider => cookies.map_or(MemberAuth::Anonymous, MemberAuth::Provider),
        StoreAuth::Anonymous => MemberAuth::Anonymous,
    };
    Ok(auth)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_provider_cookies_strips_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("cp_session=abc; provider_session=xyz; theme=dark"),
        );
        assert_eq!(
            provider_cookies(&headers).as_deref(),
            Some("provider_session=xyz; theme=dark")
        );
    }

    #[test]
    fn test_provider_cookies_none_when_only_session() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("cp_session=abc"));
        assert_eq!(provider_cookies(&headers), None);
        assert_eq!(provider_cookies(&HeaderMap::new()), None);
    }
}
