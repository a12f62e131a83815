//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{AdminClient, ApiError};
use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: AdminClient,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the points API client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, ApiError> {
        let api = AdminClient::new(&config.api)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, api }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &AdminClient {
        &self.inner.api
    }
}
