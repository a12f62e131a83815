//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers
//! 2. `TraceLayer` (span per request with status and latency)
//! 3. Request ID
//! 4. Security headers (stricter than the storefront)
//! 5. Session layer (in-memory store)

pub mod request_id;
pub mod security_headers;
pub mod session;

pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
