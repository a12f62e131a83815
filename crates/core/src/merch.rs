//! Merchandise catalog, orders and dashboard statistics.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderItemId, OrgId, Price, ProductId, UserId};

/// Products at or below this stock count are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// A product as listed by the store and merch APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock <= LOW_STOCK_THRESHOLD
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    /// Any status string this build does not know about.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Statuses an admin can set, in workflow order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// Capitalized label for display.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an order status from a form value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A line of an [`Order`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<OrderItemId>,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    pub price_at_time: Price,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price_at_time * self.quantity
    }
}

/// An order as returned by the admin and member order lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total_amount: Price,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub organization_id: Option<OrgId>,
}

impl Order {
    /// Creation date formatted for display, or the raw value if it does not
    /// parse.
    #[must_use]
    pub fn created_display(&self) -> String {
        self.created_at.as_deref().map(display_date).unwrap_or_default()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, i| count.saturating_add(i.quantity))
    }
}

/// Format an API timestamp as `Mon D, YYYY`.
///
/// Accepts RFC 3339 and naive ISO 8601 timestamps; anything else is returned
/// unchanged.
#[must_use]
pub fn display_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %-d, %Y").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%b %-d, %Y").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%a, %d %b %Y %H:%M:%S GMT") {
        return dt.format("%b %-d, %Y").to_string();
    }
    raw.to_string()
}

/// Summary numbers shown on the merch dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MerchStats {
    pub total_products: usize,
    pub total_orders: usize,
    pub revenue: Price,
    pub low_stock: usize,
}

impl MerchStats {
    /// Derive dashboard statistics from the fetched lists.
    #[must_use]
    pub fn compute(products: &[Product], orders: &[Order]) -> Self {
        Self {
            total_products: products.len(),
            total_orders: orders.len(),
            revenue: orders.iter().map(|o| o.total_amount).sum(),
            low_stock: products.iter().filter(|p| p.is_low_stock()).count(),
        }
    }
}
