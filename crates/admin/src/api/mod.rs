//! Points API client for officer and superadmin operations.
//!
//! Every request carries the configured bearer token. Paths are built from
//! segments so emails and organization prefixes are percent-encoded.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use campus_points_core::api::extract_error_message;
use campus_points_core::{
    LeaderboardEntry, NewUser, Order, OrderId, OrderStatus, OrgId, OrgPrefix, Product, ProductId,
    UserDetail, UserUpdate,
};

use crate::config::PointsApiConfig;

pub use types::{
    DeletePoints, LeaderboardResponse, MessageResponse, OAuthConfigCheck, OAuthSaveResponse,
    OAuthSettings, OAuthSummary, OAuthTestReport, OrgOAuthDetail, OrganizationInfo, ProductInput,
    StatusUpdate,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when calling the points API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

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

    /// Server-provided message, or `fallback`.
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

    /// Server message, or this error's own description.
    #[must_use]
    pub fn detail(&self) -> String {
        self.user_message(&self.to_string())
    }
}

/// Authenticated client for the points API.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl AdminClient {
    /// Create a client from API settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &PointsApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("campus-points-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                base_url: config.url.clone(),
                token: config.token.clone(),
            }),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let path = segments
            .iter()
            .map(|s| urlencoding::encode(s))
            .collect::<Vec<_>>()
            .join("/");
        Ok(self.inner.base_url.join(&path)?)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .bearer_auth(self.inner.token.expose_secret())
    }

    /// Send a request and return the raw body of a successful response.
    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = extract_error_message(&body);
        tracing::warn!(
            status = %status,
            message = message.as_deref().unwrap_or(""),
            "points API returned non-success status"
        );
        Err(ApiError::Status { status, message })
    }

    async fn call<B, T>(&self, method: Method, segments: &[&str], body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        let mut builder = self.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let body = self.execute(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse points API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Like [`Self::call`] for endpoints whose body is only an acknowledgement.
    /// Empty or non-JSON bodies count as success without a message.
    async fn ack<B>(&self, method: Method, segments: &[&str], body: Option<&B>) -> Result<MessageResponse, ApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.url(segments)?;
        let mut builder = self.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let body = self.execute(builder).await?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.call::<(), T>(Method::GET, segments, None).await
    }

    // =========================================================================
    // OAuth (superadmin)
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn oauth_settings(&self, org_id: OrgId) -> Result<OAuthSettings, ApiError> {
        let id = org_id.to_string();
        self.get(&["api", "superadmin", "organizations", &id, "oauth"])
            .await
    }

    #[instrument(skip(self, settings), fields(domains = settings.allowed_domains.len()))]
    pub async fn save_oauth_settings(
        &self,
        org_id: OrgId,
        settings: &OAuthSettings,
    ) -> Result<OAuthSaveResponse, ApiError> {
        let id = org_id.to_string();
        self.call(
            Method::PUT,
            &["api", "superadmin", "organizations", &id, "oauth"],
            Some(settings),
        )
        .await
    }

    /// Validate the stored configuration (not the unsaved draft).
    #[instrument(skip(self))]
    pub async fn test_oauth(&self, org_id: OrgId) -> Result<OAuthTestReport, ApiError> {
        let id = org_id.to_string();
        self.call::<(), _>(
            Method::POST,
            &["api", "superadmin", "organizations", &id, "oauth", "test"],
            None,
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn oauth_summary(&self) -> Result<OAuthSummary, ApiError> {
        self.get(&["api", "superadmin", "organizations", "oauth", "summary"])
            .await
    }

    // =========================================================================
    // Points
    // =========================================================================

    /// Ranked rows in server order.
    #[instrument(skip(self), fields(org = %org))]
    pub async fn leaderboard(&self, org: &OrgPrefix) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let response: LeaderboardResponse = self
            .get(&["api", "public", org.as_str(), "leaderboard"])
            .await?;
        Ok(response.leaderboard)
    }

    #[instrument(skip(self), fields(org = %org))]
    pub async fn user_detail(&self, org: &OrgPrefix, email: &str) -> Result<UserDetail, ApiError> {
        self.get(&["api", "points", org.as_str(), "users", email, "points"])
            .await
    }

    #[instrument(skip(self, update), fields(org = %org))]
    pub async fn update_user(
        &self,
        org: &OrgPrefix,
        email: &str,
        update: &UserUpdate,
    ) -> Result<MessageResponse, ApiError> {
        self.ack(
            Method::PUT,
            &["api", "points", org.as_str(), "users", email],
            Some(update),
        )
        .await
    }

    #[instrument(skip(self, user), fields(org = %org))]
    pub async fn create_user(&self, org: &OrgPrefix, user: &NewUser) -> Result<MessageResponse, ApiError> {
        self.ack(Method::POST, &["api", "points", org.as_str(), "users"], Some(user))
            .await
    }

    #[instrument(skip(self), fields(org = %org))]
    pub async fn delete_points(
        &self,
        org: &OrgPrefix,
        user_email: &str,
        event: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.ack(
            Method::DELETE,
            &["api", "points", org.as_str(), "delete_points"],
            Some(&DeletePoints { user_email, event }),
        )
        .await
    }

    // =========================================================================
    // Merchandise
    // =========================================================================

    #[instrument(skip(self), fields(org = %org))]
    pub async fn products(&self, org: &OrgPrefix) -> Result<Vec<Product>, ApiError> {
        self.get(&["api", "merch", org.as_str(), "products"]).await
    }

    #[instrument(skip(self), fields(org = %org))]
    pub async fn product(&self, org: &OrgPrefix, id: ProductId) -> Result<Product, ApiError> {
        let id = id.to_string();
        self.get(&["api", "merch", org.as_str(), "products", &id])
            .await
    }

    #[instrument(skip(self, input), fields(org = %org))]
    pub async fn create_product(
        &self,
        org: &OrgPrefix,
        input: &ProductInput,
    ) -> Result<MessageResponse, ApiError> {
        self.ack(Method::POST, &["api", "merch", org.as_str(), "products"], Some(input))
            .await
    }

    #[instrument(skip(self, input), fields(org = %org))]
    pub async fn update_product(
        &self,
        org: &OrgPrefix,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<MessageResponse, ApiError> {
        let id = id.to_string();
        self.ack(
            Method::PUT,
            &["api", "merch", org.as_str(), "products", &id],
            Some(input),
        )
        .await
    }

    #[instrument(skip(self), fields(org = %org))]
    pub async fn delete_product(&self, org: &OrgPrefix, id: ProductId) -> Result<MessageResponse, ApiError> {
        let id = id.to_string();
        self.ack::<()>(
            Method::DELETE,
            &["api", "merch", org.as_str(), "products", &id],
            None,
        )
        .await
    }

    #[instrument(skip(self), fields(org = %org))]
    pub async fn orders(&self, org: &OrgPrefix) -> Result<Vec<Order>, ApiError> {
        self.get(&["api", "merch", org.as_str(), "orders"]).await
    }

    #[instrument(skip(self), fields(org = %org))]
    pub async fn update_order_status(
        &self,
        org: &OrgPrefix,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<MessageResponse, ApiError> {
        let id = id.to_string();
        self.ack(
            Method::PUT,
            &["api", "merch", org.as_str(), "orders", &id],
            Some(&StatusUpdate { status }),
        )
        .await
    }

    /// Check that the API host answers at all.
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
