//! Campus Points Core - Shared domain library.
//!
//! This crate provides the types and rules shared by the Campus Points binaries:
//! - `storefront` - Member login and merchandise store
//! - `admin` - Officer and superadmin panel (leaderboard, users, merch, OAuth)
//! - `cli` - Command-line reporting tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no sessions,
//! no HTTP clients. The points API is the source of truth; everything here
//! mirrors its JSON payloads or derives views from them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, organization prefixes, emails, prices
//! - [`cart`] - Client-side cart with stock clamping
//! - [`domains`] - Duplicate-free allowed-domain list for OAuth settings
//! - [`leaderboard`] - Leaderboard rows and user points history
//! - [`merch`] - Products, orders and dashboard statistics
//! - [`users`] - User create/update payloads
//! - [`notice`] - One-shot flash notifications
//! - [`api`] - Helpers for points API error bodies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod domains;
pub mod leaderboard;
pub mod merch;
pub mod notice;
pub mod types;
pub mod users;

pub use cart::{Cart, CartChange, CartItem, OrderLine, OrderRequest, ProductSnapshot};
pub use domains::{DomainAdd, DomainSet};
pub use leaderboard::{
    LeaderboardEntry, PointsRecord, UserDetail, UserProfile, format_points, ranked,
};
pub use merch::{
    LOW_STOCK_THRESHOLD, MerchStats, Order, OrderItem, OrderStatus, Product, UnknownStatus,
    display_date,
};
pub use notice::{Flash, FlashLevel};
pub use types::*;
pub use users::{NewUser, UserUpdate, non_blank};
