//! Subcommand implementations.
//!
//! Each command returns its report as a string so the formatting can be
//! tested without a terminal.

pub mod leaderboard;
pub mod oauth_summary;

use thiserror::Error;

use campus_points_admin::api::{AdminClient, ApiError};
use campus_points_admin::config::{ConfigError, PointsApiConfig};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// `POINTS_API_URL` or `POINTS_API_TOKEN` missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Points API request failed.
    #[error("Points API error: {}", .0.detail())]
    Api(#[from] ApiError),
}

/// Build an admin client from the environment.
///
/// # Errors
///
/// Returns `CliError::Config` if the API settings are missing or invalid.
pub fn client() -> Result<AdminClient, CliError> {
    let config = PointsApiConfig::from_env()?;
    tracing::debug!(api = %config.url, "using points API");
    Ok(AdminClient::new(&config)?)
}
