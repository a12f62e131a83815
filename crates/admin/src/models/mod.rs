//! Session-backed state for the admin console.

pub mod session;

pub use session::{AdminSession, keys as session_keys};
