//! Points API client for the member storefront.
//!
//! # Authentication
//!
//! Member endpoints accept two kinds of caller:
//! - a member who logged in through the storefront form, identified by the
//!   `X-Member-User-Id` header
//! - a member signed in through their organization's OAuth provider, whose
//!   provider session cookies are forwarded from the browser
//!
//! Anonymous callers can only read the public catalog.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use campus_points_core::api::extract_error_message;
use campus_points_core::{Order, OrderRequest, OrgPrefix, UserId};

pub use types::{
    LoginResponse, MemberLoginRequest, MemberOrg, MemberProfile, MemberUser, PlacedOrder,
    StoreCatalog,
};

/// Header carrying the id of a form-authenticated member.
pub const MEMBER_USER_HEADER: &str = "X-Member-User-Id";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when calling the points API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// Server-provided message, or `fallback` when there is none.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// How a member request authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAuth<'a> {
    /// Form login: send `X-Member-User-Id`.
    Member(UserId),
    /// OAuth provider session: forward this `Cookie` header value.
    Provider(&'a str),
    Anonymous,
}

/// Client for the points API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct PointsClient {
    inner: Arc<PointsClientInner>,
}

struct PointsClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl PointsClient {
    /// Create a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("campus-points-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(PointsClientInner { client, base_url }),
        })
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let path = segments
            .iter()
            .map(|s| urlencoding::encode(s))
            .collect::<Vec<_>>()
            .join("/");
        Ok(self.inner.base_url.join(&path)?)
    }

    fn authorize(builder: reqwest::RequestBuilder, auth: MemberAuth<'_>) -> reqwest::RequestBuilder {
        match auth {
            MemberAuth::Member(user_id) => builder.header(MEMBER_USER_HEADER, user_id.to_string()),
            MemberAuth::Provider(cookies) => builder.header(reqwest::header::COOKIE, cookies),
            MemberAuth::Anonymous => builder,
        }
    }

    /// Send a request and decode a JSON body, mapping error statuses.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = extract_error_message(&body);
            tracing::warn!(
                status = %status,
                message = message.as_deref().unwrap_or(""),
                "points API returned non-success status"
            );
            return Err(ApiError::Status { status, message });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse points API response"
            );
            ApiError::Parse(e)
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        auth: MemberAuth<'_>,
    ) -> Result<T, ApiError> {
        let url = self.url(segments)?;
        self.send(Self::authorize(self.inner.client.get(url), auth))
            .await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        auth: MemberAuth<'_>,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(segments)?;
        self.send(Self::authorize(self.inner.client.post(url).json(body), auth))
            .await
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// Log a member in with the storefront form.
    #[instrument(skip(self, request), fields(org = %org))]
    pub async fn member_login(
        &self,
        org: &OrgPrefix,
        request: &MemberLoginRequest,
    ) -> Result<LoginResponse, ApiError> {
        self.post(
            &["api", "points", org.as_str(), "member_login"],
            MemberAuth::Anonymous,
            request,
        )
        .await
    }

    /// List the caller's orders. Doubles as the authentication check.
    #[instrument(skip(self, auth), fields(org = %org))]
    pub async fn member_orders(
        &self,
        org: &OrgPrefix,
        auth: MemberAuth<'_>,
    ) -> Result<Vec<Order>, ApiError> {
        self.get(&["api", "merch", org.as_str(), "members", "orders"], auth)
            .await
    }

    #[instrument(skip(self, auth), fields(org = %org))]
    pub async fn member_profile(
        &self,
        org: &OrgPrefix,
        auth: MemberAuth<'_>,
    ) -> Result<MemberProfile, ApiError> {
        let mut url = self.url(&["api", "points", org.as_str(), "member_profile"])?;
        url.query_pairs_mut()
            .append_pair("organization_prefix", org.as_str());
        self.send(Self::authorize(self.inner.client.get(url), auth))
            .await
    }

    /// Member catalog (may include member-only products).
    #[instrument(skip(self, auth), fields(org = %org))]
    pub async fn member_store(
        &self,
        org: &OrgPrefix,
        auth: MemberAuth<'_>,
    ) -> Result<StoreCatalog, ApiError> {
        self.get(&["api", "merch", org.as_str(), "members", "store"], auth)
            .await
    }

    /// Public catalog.
    #[instrument(skip(self), fields(org = %org))]
    pub async fn public_store(&self, org: &OrgPrefix) -> Result<StoreCatalog, ApiError> {
        self.get(&["api", "merch", org.as_str(), "store"], MemberAuth::Anonymous)
            .await
    }

    #[instrument(skip(self, auth, order), fields(org = %org, items = order.items.len()))]
    pub async fn place_order(
        &self,
        org: &OrgPrefix,
        auth: MemberAuth<'_>,
        order: &OrderRequest,
    ) -> Result<PlacedOrder, ApiError> {
        self.post(&["api", "merch", org.as_str(), "members", "orders"], auth, order)
            .await
    }

    /// Check that the API host answers at all. Any HTTP status counts.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.inner
            .client
            .get(self.inner.base_url.clone())
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> PointsClient {
        PointsClient::new(Url::parse("http://api.test/base/").unwrap()).unwrap()
    }

    #[test]
    fn test_url_encodes_segments() {
        let url = client()
            .url(&["api", "points", "acm", "users", "a b@asu.edu", "points"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://api.test/base/api/points/acm/users/a%20b%40asu.edu/points"
        );
    }

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: Some("Insufficient stock for product Mug".to_string()),
        };
        assert_eq!(err.user_message("fallback"), "Insufficient stock for product Mug");
        assert!(!err.is_not_found());

        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            message: None,
        };
        assert_eq!(err.user_message("fallback"), "fallback");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            message: Some("Not a member".to_string()),
        };
        assert_eq!(err.to_string(), "API returned 403 Forbidden: Not a member");
    }
}
