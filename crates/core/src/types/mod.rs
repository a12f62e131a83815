//! Core types for Campus Points.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod org;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use org::{OrgPrefix, OrgPrefixError};
pub use price::Price;
