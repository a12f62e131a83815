//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                         - Liveness
//! GET  /health/ready                                   - Readiness (points API reachable)
//! GET  /                                               - Redirect to the OAuth summary
//!
//! # OAuth (superadmin)
//! GET  /superadmin/oauth/summary                       - Summary across organizations
//! POST /superadmin/oauth/summary/refresh               - Re-fetch the summary
//! POST /superadmin/oauth/summary/toggle/{org_id}       - Expand/collapse a row
//! GET  /superadmin/organizations/{id}/oauth            - OAuth settings editor
//! POST /superadmin/organizations/{id}/oauth            - Add/remove domain, save, test
//!
//! # Leaderboard
//! GET  /orgs/{org}/leaderboard                         - Ranking (?user=&mode=edit&confirm=)
//! POST /orgs/{org}/leaderboard/users/{email}           - Save user edits
//! POST /orgs/{org}/leaderboard/users/{email}/points/delete - Delete a points entry
//!
//! # Users
//! GET  /orgs/{org}/users                               - Find by ?email=
//! POST /orgs/{org}/users/update                        - Update the found user
//! POST /orgs/{org}/users/create                        - Create a user
//!
//! # Merchandise
//! GET  /orgs/{org}/merch                               - Dashboard
//! GET  /orgs/{org}/merch/products/new                  - New product form
//! POST /orgs/{org}/merch/products/new                  - Create product
//! GET  /orgs/{org}/merch/products/{id}/edit            - Edit product form
//! POST /orgs/{org}/merch/products/{id}/edit            - Save product
//! GET  /orgs/{org}/merch/products/{id}/delete          - Delete confirmation
//! POST /orgs/{org}/merch/products/{id}/delete          - Delete product
//! POST /orgs/{org}/merch/orders/{id}/status            - Set order status
//! ```

pub mod health;
pub mod leaderboard;
pub mod merch;
pub mod oauth;
pub mod oauth_summary;
pub mod users;

use axum::{Router, response::Redirect, routing::get};

use crate::state::AppState;

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route(
            "/",
            get(|| async { Redirect::to("/superadmin/oauth/summary") }),
        )
        .merge(oauth_summary::router())
        .merge(oauth::router())
        .merge(leaderboard::router())
        .merge(users::router())
        .merge(merch::router())
}
