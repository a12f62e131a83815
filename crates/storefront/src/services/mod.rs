//! Business logic services for the storefront.
//!
//! - `member_auth` - Works out how a browser is authenticated for a store

pub mod member_auth;

pub use member_auth::{Reconciled, provider_cookies, reconcile, request_auth};
