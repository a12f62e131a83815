//! Member shopping cart.
//!
//! The cart lives entirely on the UI side: the points API only sees it when an
//! order is placed. Each line keeps a snapshot of the product taken when it was
//! first added, including the price that will be sent at checkout.
//!
//! Quantities never exceed the last-known stock for the product. Attempts to
//! go past it clamp to the stock count and report [`CartChange::Clamped`] so
//! the caller can warn the member.

use serde::{Deserialize, Serialize};

use crate::merch::Product;
use crate::types::{Price, ProductId};

/// Product data captured when it is added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub stock: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
            description: product.description.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line (captured unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// Outcome of a cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was created with quantity 1.
    Added,
    /// An existing line's quantity changed to the requested value.
    Updated,
    /// The requested quantity exceeded stock; the line now holds `available`.
    Clamped { available: u32 },
    /// The line was removed.
    Removed,
    /// The product has no stock and was not added.
    OutOfStock,
    /// The product is not in the cart.
    NotInCart,
}

impl CartChange {
    /// Warning text for changes limited by stock.
    #[must_use]
    pub fn stock_warning(&self) -> Option<String> {
        match self {
            Self::Clamped { available } => {
                Some(format!("Only {available} items available in stock"))
            }
            Self::OutOfStock => Some("This item is out of stock".to_string()),
            _ => None,
        }
    }
}

/// Ordered list of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add one unit of a product.
    ///
    /// If the product is already in the cart its stock is refreshed from the
    /// snapshot (the captured price is kept) and the quantity goes up by one,
    /// unless that would exceed stock.
    pub fn add(&mut self, product: ProductSnapshot) -> CartChange {
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            item.product.stock = product.stock;
            if item.quantity < product.stock {
                item.quantity += 1;
                return CartChange::Updated;
            }
            item.quantity = product.stock;
            if item.quantity == 0 {
                self.remove(product.id);
                return CartChange::OutOfStock;
            }
            return CartChange::Clamped {
                available: product.stock,
            };
        }

        if product.stock == 0 {
            return CartChange::OutOfStock;
        }

        self.items.push(CartItem {
            product,
            quantity: 1,
        });
        CartChange::Added
    }

    /// Set the quantity of a line.
    ///
    /// Zero or negative quantities remove the line; quantities above the
    /// snapshot's stock are clamped.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> CartChange {
        if quantity <= 0 {
            return if self.remove(product_id) {
                CartChange::Removed
            } else {
                CartChange::NotInCart
            };
        }

        let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) else {
            return CartChange::NotInCart;
        };

        let available = item.product.stock;
        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        if requested > available {
            item.quantity = available;
            CartChange::Clamped { available }
        } else {
            item.quantity = requested;
            CartChange::Updated
        }
    }

    /// Remove a line. Returns `true` if it was present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        self.items.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of line totals at captured prices.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Build the order payload for checkout.
    ///
    /// Prices are the ones captured at add-to-cart time; they are not
    /// re-validated against the live catalog.
    #[must_use]
    pub fn to_order_request(&self) -> OrderRequest {
        OrderRequest {
            total_amount: self.total(),
            items: self
                .items
                .iter()
                .map(|i| OrderLine {
                    product_id: i.product.id,
                    quantity: i.quantity,
                    price: i.product.price,
                })
                .collect(),
        }
    }
}

/// Body of `POST /api/merch/{org}/members/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub total_amount: Price,
    pub items: Vec<OrderLine>,
}

/// One line of an [`OrderRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
}
