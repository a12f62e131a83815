//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (points API reachable)
//!
//! GET  /store/auth/return              - Back from organization OAuth
//!
//! GET  /store/{org}                    - Store page (?tab=store|dashboard|orders|cart)
//! GET  /store/{org}/login              - Member login form
//! POST /store/{org}/login              - Member login
//! GET  /store/{org}/login/oauth        - Hand off to organization OAuth
//! POST /store/{org}/logout             - Logout
//! POST /store/{org}/cart/add           - Add one unit of a product
//! POST /store/{org}/cart/update        - Set a line's quantity
//! POST /store/{org}/cart/remove        - Remove a line
//! POST /store/{org}/checkout           - Place an order
//! ```

pub mod cart;
pub mod health;
pub mod login;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Routes for one organization's store, nested under `/store/{org}`.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(store::show))
        .route("/login", get(login::login_page).post(login::login))
        .route("/login/oauth", get(login::oauth_login))
        .route("/logout", post(login::logout))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/checkout", post(cart::checkout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route(login::OAUTH_RETURN_PATH, get(login::oauth_return))
        .nest("/store/{org}", store_routes())
}
