//! Cart and checkout handlers.
//!
//! The cart is kept in the session under `cart_{org}`; nothing here touches
//! the points API except adding (to snapshot the product) and checkout.
//! Every handler redirects back to the store page.

use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use campus_points_core::{CartChange, Flash, OrgPrefix, ProductId, ProductSnapshot};

use crate::api::MemberAuth;
use crate::error::Result;
use crate::models::MemberSession;
use crate::routes::store::{StoreTab, load_catalog, store_url};
use crate::services::{provider_cookies, request_auth};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Flash for a cart change. `None` means nothing worth telling.
fn change_flash(change: CartChange, product_name: &str) -> Option<Flash> {
    if let Some(warning) = change.stock_warning() {
        return Some(Flash::warning(warning));
    }
    match change {
        CartChange::Added | CartChange::Updated => {
            Some(Flash::success(format!("Added {product_name} to cart")))
        }
        _ => None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Add one unit of a product, snapshotting it from the current catalog.
#[instrument(skip(state, session, headers), fields(org = %org))]
pub async fn add(
    State(state): State<AppState>,
    Path(org): Path<OrgPrefix>,
    session: MemberSession,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let cookies = provider_cookies(&headers);
    let auth = request_auth(&session, &org, cookies.as_deref()).await?;

    let flash = match load_catalog(state.api(), &org, auth).await {
        Ok(catalog) => match catalog.product(form.product_id) {
            Some(product) => {
                let mut cart = session.cart(&org).await?;
                let change = cart.add(ProductSnapshot::from(product));
                session.save_cart(&org, &cart).await?;
                tracing::debug!(product_id = %form.product_id, ?change, "cart add");
                change_flash(change, &product.name)
            }
            None => Some(Flash::error("That product is no longer available")),
        },
        Err(e) => {
            tracing::warn!(error = %e, "failed to load catalog for add to cart");
            Some(Flash::error(format!(
                "Failed to add to cart. {}",
                e.user_message(&e.to_string())
            )))
        }
    };

    if let Some(flash) = flash {
        session.flash(flash).await?;
    }
    Ok(Redirect::to(&store_url(&org, StoreTab::Store)))
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(session), fields(org = %org))]
pub async fn update(
    Path(org): Path<OrgPrefix>,
    session: MemberSession,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let mut cart = session.cart(&org).await?;
    let change = cart.set_quantity(form.product_id, form.quantity);
    session.save_cart(&org, &cart).await?;

    if let Some(warning) = change.stock_warning() {
        session.flash(Flash::warning(warning)).await?;
    }
    Ok(Redirect::to(&store_url(&org, StoreTab::Cart)))
}

#[instrument(skip(session), fields(org = %org))]
pub async fn remove(
    Path(org): Path<OrgPrefix>,
    session: MemberSession,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    let mut cart = session.cart(&org).await?;
    cart.remove(form.product_id);
    session.save_cart(&org, &cart).await?;
    Ok(Redirect::to(&store_url(&org, StoreTab::Cart)))
}

/// Place an order for the cart at the prices captured when items were added.
#[instrument(skip(state, session, headers), fields(org = %org))]
pub async fn checkout(
    State(state): State<AppState>,
    Path(org): Path<OrgPrefix>,
    session: MemberSession,
    headers: HeaderMap,
) -> Result<Redirect> {
    let cookies = provider_cookies(&headers);
    let auth = request_auth(&session, &org, cookies.as_deref()).await?;

    if auth == MemberAuth::Anonymous {
        session
            .flash(Flash::error("Please login to place an order"))
            .await?;
        return Ok(Redirect::to(&format!("/store/{org}/login")));
    }

    let cart = session.cart(&org).await?;
    if cart.is_empty() {
        session.flash(Flash::error("Your cart is empty")).await?;
        return Ok(Redirect::to(&store_url(&org, StoreTab::Cart)));
    }

    match state
        .api()
        .place_order(&org, auth, &cart.to_order_request())
        .await
    {
        Ok(placed) => {
            tracing::info!(order_id = ?placed.id, total = %cart.total(), "order placed");
            session.clear_cart(&org).await?;
            session
                .flash(Flash::success("Order placed successfully!"))
                .await?;
            Ok(Redirect::to(&store_url(&org, StoreTab::Orders)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "order failed");
            session
                .flash(Flash::error(format!(
                    "Failed to place order: {}",
                    e.user_message(&e.to_string())
                )))
                .await?;
            Ok(Redirect::to(&store_url(&org, StoreTab::Cart)))
        }
    }
}

#[cfg(test)]
mod tests {
    use campus_points_core::FlashLevel;

    use super::*;

    #[test]
    fn test_change_flash() {
        let clamped = change_flash(CartChange::Clamped { available: 2 }, "Mug");
        assert_eq!(
            clamped.map(|f| (f.level, f.message)),
            Some((FlashLevel::Warning, "Only 2 items available in stock".to_string()))
        );

        let added = change_flash(CartChange::Added, "Mug");
        assert_eq!(
            added.map(|f| f.message),
            Some("Added Mug to cart".to_string())
        );

        assert!(change_flash(CartChange::Removed, "Mug").is_none());
    }
}
