//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiError, PointsClient};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: PointsClient,
}

impl AppState {
    /// Create the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the points API client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = PointsClient::new(config.api_url.clone())?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, api }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The points API client.
    #[must_use]
    pub fn api(&self) -> &PointsClient {
        &self.inner.api
    }
}
