//! Member store page.
//!
//! One page with four tabs (store, dashboard, orders, cart). The tab is view
//! state carried in the query string; every load reconciles authentication
//! and re-fetches the catalog.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use campus_points_core::{Cart, Flash, Order, OrgPrefix, Product, format_points};

use crate::api::{ApiError, MemberAuth, MemberProfile, PointsClient, StoreCatalog};
use crate::error::Result;
use crate::filters;
use crate::models::{MemberSession, StoreAuth};
use crate::services::{provider_cookies, reconcile, request_auth};
use crate::state::AppState;

// =============================================================================
// Tabs
// =============================================================================

/// Store page tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreTab {
    #[default]
    Store,
    Dashboard,
    Orders,
    Cart,
}

impl StoreTab {
    /// Parse a `?tab=` value; anything unknown shows the catalog.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("dashboard") => Self::Dashboard,
            Some("orders") => Self::Orders,
            Some("cart") => Self::Cart,
            _ => Self::Store,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Dashboard => "dashboard",
            Self::Orders => "orders",
            Self::Cart => "cart",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreQuery {
    pub tab: Option<String>,
}

/// Store page URL for a tab.
#[must_use]
pub fn store_url(org: &OrgPrefix, tab: StoreTab) -> String {
    match tab {
        StoreTab::Store => format!("/store/{org}"),
        other => format!("/store/{org}?tab={}", other.as_str()),
    }
}

// =============================================================================
// View Models
// =============================================================================

pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub stock: u32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            price: product.price.to_string(),
            stock: product.stock,
            description: product.description.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

pub struct CartLineView {
    pub product_id: i32,
    pub name: String,
    pub unit_price: String,
    pub quantity: u32,
    pub stock: u32,
    pub line_total: String,
}

pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart
                .items()
                .iter()
                .map(|item| CartLineView {
                    product_id: item.product.id.as_i32(),
                    name: item.product.name.clone(),
                    unit_price: item.product.price.to_string(),
                    quantity: item.quantity,
                    stock: item.product.stock,
                    line_total: item.line_total().to_string(),
                })
                .collect(),
            total: cart.total().to_string(),
            count: cart.item_count(),
        }
    }
}

pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
}

pub struct OrderView {
    pub id: i32,
    pub status: &'static str,
    pub status_label: &'static str,
    pub created: String,
    pub total: String,
    pub message: Option<String>,
    pub items: Vec<OrderItemView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            status: order.status.as_str(),
            status_label: order.status.label(),
            created: order.created_display(),
            total: order.total_amount.to_string(),
            message: order.message.clone(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item
                        .product_name
                        .clone()
                        .unwrap_or_else(|| format!("Product #{}", item.product_id)),
                    quantity: item.quantity,
                    price: item.price_at_time.to_string(),
                })
                .collect(),
        }
    }
}

pub struct MembershipView {
    pub name: String,
    pub prefix: String,
    pub description: Option<String>,
    pub points: String,
    pub is_current: bool,
}

pub struct ProfileView {
    pub name: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub asu_id: Option<String>,
    pub discord_linked: bool,
    pub current_org: Option<String>,
    pub current_points: String,
    pub total_points: String,
    pub memberships: Vec<MembershipView>,
}

impl From<MemberProfile> for ProfileView {
    fn from(profile: MemberProfile) -> Self {
        let user = profile.user;
        Self {
            name: user
                .as_ref()
                .and_then(|u| u.name.clone())
                .unwrap_or_default(),
            username: user.as_ref().and_then(|u| u.username.clone()),
            email: user.as_ref().and_then(|u| u.email.clone()),
            asu_id: user
                .as_ref()
                .and_then(|u| u.asu_id.clone())
                .filter(|id| id != "N/A"),
            discord_linked: user.as_ref().is_some_and(|u| u.discord_linked),
            current_org: profile.current_organization.as_ref().map(|o| o.name.clone()),
            current_points: format_points(
                profile
                    .current_organization
                    .as_ref()
                    .map_or(0.0, |o| o.points),
            ),
            total_points: format_points(profile.total_points_all_orgs),
            memberships: profile
                .organizations
                .into_iter()
                .map(|o| MembershipView {
                    name: o.name,
                    prefix: o.prefix,
                    description: o.description,
                    points: format_points(o.points),
                    is_current: o.is_current,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "store.html")]
pub struct StoreTemplate {
    pub org: String,
    pub tab: &'static str,
    pub flash: Option<Flash>,
    pub store_name: String,
    pub store_description: Option<String>,
    pub authenticated: bool,
    pub via_provider: bool,
    pub member_name: Option<String>,
    pub products: Vec<ProductView>,
    pub cart: CartView,
    pub orders: Vec<OrderView>,
    pub profile: Option<ProfileView>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Fetch the catalog, preferring the member view.
pub(crate) async fn load_catalog(
    api: &PointsClient,
    org: &OrgPrefix,
    auth: MemberAuth<'_>,
) -> std::result::Result<StoreCatalog, ApiError> {
    match api.member_store(org, auth).await {
        Ok(catalog) => Ok(catalog),
        Err(e) => {
            tracing::debug!(error = %e, "member catalog unavailable, using public catalog");
            api.public_store(org).await
        }
    }
}

/// Display the store page.
#[instrument(skip(state, session, headers, query), fields(org = %org))]
pub async fn show(
    State(state): State<AppState>,
    Path(org): Path<OrgPrefix>,
    Query(query): Query<StoreQuery>,
    session: MemberSession,
    headers: HeaderMap,
) -> Result<Response> {
    let tab = StoreTab::from_query(query.tab.as_deref());

    if session.enter_store(&org).await? {
        tracing::info!("switched store organization, previous cart cleared");
    }

    let cookies = provider_cookies(&headers);
    let reconciled = reconcile(state.api(), &session, &org, cookies.as_deref()).await?;
    let auth = request_auth(&session, &org, cookies.as_deref()).await?;

    let profile = if reconciled.auth == StoreAuth::Anonymous {
        None
    } else {
        match state.api().member_profile(&org, auth).await {
            Ok(profile) => Some(ProfileView::from(profile)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load member profile");
                None
            }
        }
    };

    let identity = session.identity().await?;
    let member_name = identity
        .filter(|id| reconciled.auth == StoreAuth::Member && id.org.prefix == org)
        .map(|id| id.user.name)
        .or_else(|| profile.as_ref().map(|p| p.name.clone()).filter(|n| !n.is_empty()));

    let cart = session.cart(&org).await?;

    let (store_name, store_description, products, error) =
        match load_catalog(state.api(), &org, auth).await {
            Ok(catalog) => (
                catalog.organization.name,
                catalog.organization.description,
                catalog.products.iter().map(ProductView::from).collect(),
                None,
            ),
            Err(e) => {
                tracing::error!(error = %e, "failed to load store");
                (
                    org.to_string(),
                    None,
                    Vec::new(),
                    Some(format!("Failed to load store. {}", e.user_message(&e.to_string()))),
                )
            }
        };

    let flash = session.take_flash().await?;

    Ok(StoreTemplate {
        org: org.to_string(),
        tab: tab.as_str(),
        flash,
        store_name,
        store_description,
        authenticated: reconciled.auth != StoreAuth::Anonymous,
        via_provider: reconciled.auth == StoreAuth::Provider,
        member_name,
        products,
        cart: CartView::from(&cart),
        orders: reconciled.orders.iter().map(OrderView::from).collect(),
        profile,
        error,
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_from_query() {
        assert_eq!(StoreTab::from_query(None), StoreTab::Store);
        assert_eq!(StoreTab::from_query(Some("cart")), StoreTab::Cart);
        assert_eq!(StoreTab::from_query(Some("bogus")), StoreTab::Store);
    }

    #[test]
    fn test_store_url() {
        let org = OrgPrefix::parse("acm").unwrap();
        assert_eq!(store_url(&org, StoreTab::Store), "/store/acm");
        assert_eq!(store_url(&org, StoreTab::Orders), "/store/acm?tab=orders");
    }
}
