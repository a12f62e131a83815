//! Session-backed models for the storefront.

pub mod session;

pub use session::{MemberIdentity, MemberSession, StoreAuth, keys as session_keys};
