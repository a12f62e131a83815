//! Merchandise dashboard: products, orders and their stats.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use campus_points_core::{
    Flash, MerchStats, Order, OrderId, OrderStatus, OrgPrefix, Price, Product, ProductId,
};

use crate::api::ProductInput;
use crate::error::Result;
use crate::filters;
use crate::models::AdminSession;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orgs/{org}/merch", get(dashboard))
        .route(
            "/orgs/{org}/merch/products/new",
            get(new_product).post(create_product),
        )
        .route(
            "/orgs/{org}/merch/products/{id}/edit",
            get(edit_product).post(update_product),
        )
        .route(
            "/orgs/{org}/merch/products/{id}/delete",
            get(confirm_delete).post(delete_product),
        )
        .route("/orgs/{org}/merch/orders/{id}/status", post(update_status))
}

fn dashboard_url(org: &OrgPrefix) -> String {
    format!("/orgs/{org}/merch")
}

// =============================================================================
// Dashboard
// =============================================================================

pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub stock: u32,
    pub low_stock: bool,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            price: product.price.to_string(),
            stock: product.stock,
            low_stock: product.is_low_stock(),
        }
    }
}

pub struct OrderRow {
    pub id: i32,
    pub customer: String,
    pub created: String,
    pub total: String,
    pub item_count: u32,
    pub lines: Vec<String>,
    pub message: Option<String>,
    pub status: OrderStatus,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            customer: order
                .user_name
                .clone()
                .or_else(|| order.user_id.map(|id| format!("User #{id}")))
                .unwrap_or_default(),
            created: order.created_display(),
            total: order.total_amount.to_string(),
            item_count: order.item_count(),
            lines: order
                .items
                .iter()
                .map(|item| {
                    let name = item
                        .product_name
                        .clone()
                        .unwrap_or_else(|| format!("Product #{}", item.product_id));
                    format!("{} x {name} ({})", item.quantity, item.line_total())
                })
                .collect(),
            message: order.message.clone().filter(|m| !m.is_empty()),
            status: order.status,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "merch/index.html")]
pub struct MerchDashboardTemplate {
    pub org: String,
    pub flash: Option<Flash>,
    pub error: Option<String>,
    pub stats: MerchStats,
    pub products: Vec<ProductRow>,
    pub orders: Vec<OrderRow>,
    pub statuses: [OrderStatus; 5],
}

/// Fetch products and orders together; either failing fails the page.
#[instrument(skip(state, session), fields(org = %org))]
pub async fn dashboard(
    State(state): State<AppState>,
    Path(org): Path<OrgPrefix>,
    session: AdminSession,
) -> Result<MerchDashboardTemplate> {
    let api = state.api();
    let mut page = MerchDashboardTemplate {
        org: org.to_string(),
        flash: session.take_flash().await?,
        error: None,
        stats: MerchStats::default(),
        products: Vec::new(),
        orders: Vec::new(),
        statuses: OrderStatus::ALL,
    };

    match tokio::try_join!(api.products(&org), api.orders(&org)) {
        Ok((products, orders)) => {
            page.stats = MerchStats::compute(&products, &orders);
            page.products = products.iter().map(ProductRow::from).collect();
            page.orders = orders.iter().map(OrderRow::from).collect();
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch merch data");
            page.error = Some(format!("Failed to fetch data. {}", e.detail()));
        }
    }
    Ok(page)
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

#[instrument(skip(state, session, form), fields(org = %org, order = %id))]
pub async fn update_status(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrgPrefix, OrderId)>,
    session: AdminSession,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let flash = match form.status.parse::<OrderStatus>() {
        Err(e) => Flash::error(format!("Failed to update order status: {e}")),
        Ok(status) => match state.api().update_order_status(&org, id, status).await {
            Ok(_) => {
                tracing::info!(%status, "order status updated");
                Flash::success("Order status updated successfully!")
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to update order status");
                Flash::error(format!("Failed to update order status: {}", e.detail()))
            }
        },
    };
    session.flash(flash).await?;
    Ok(Redirect::to(&dashboard_url(&org)))
}

// =============================================================================
// Delete Product
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "merch/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub org: String,
    pub flash: Option<Flash>,
    pub product_id: i32,
    pub product_name: String,
}

#[instrument(skip(state), fields(org = %org, product = %id))]
pub async fn confirm_delete(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrgPrefix, ProductId)>,
) -> Result<ConfirmDeleteTemplate> {
    let product_name = match state.api().product(&org, id).await {
        Ok(product) => product.name,
        Err(e) => {
            tracing::debug!(error = %e, "product lookup for delete confirmation failed");
            format!("Product #{id}")
        }
    };
    Ok(ConfirmDeleteTemplate {
        org: org.to_string(),
        flash: None,
        product_id: id.as_i32(),
        product_name,
    })
}

#[instrument(skip(state, session), fields(org = %org, product = %id))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrgPrefix, ProductId)>,
    session: AdminSession,
) -> Result<Redirect> {
    let flash = match state.api().delete_product(&org, id).await {
        Ok(_) => {
            tracing::info!("product deleted");
            Flash::success("Product deleted successfully!")
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to delete product");
            Flash::error(format!("Failed to delete product: {}", e.detail()))
        }
    };
    session.flash(flash).await?;
    Ok(Redirect::to(&dashboard_url(&org)))
}

// =============================================================================
// Create / Edit Product
// =============================================================================

/// Raw product form values, kept as typed so a failed submit re-renders them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
}

impl ProductForm {
    fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.plain(),
            stock: product.stock.to_string(),
            description: product.description.clone().unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }

    /// Validate into an API payload, or the message to show.
    fn validate(&self) -> std::result::Result<ProductInput, &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Product name is required");
        }
        let price = self
            .price
            .trim()
            .trim_start_matches('$')
            .parse::<Decimal>()
            .ok()
            .filter(|p| !p.is_sign_negative())
            .ok_or("Price must be a non-negative number")?;
        let stock = self
            .stock
            .trim()
            .parse::<u32>()
            .map_err(|_| "Stock must be a whole number")?;
        Ok(ProductInput {
            name: name.to_string(),
            price: Price::new(price),
            stock,
            description: self.description.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
        })
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "merch/product_form.html")]
pub struct ProductFormTemplate {
    pub org: String,
    pub flash: Option<Flash>,
    /// `None` when creating.
    pub product_id: Option<i32>,
    pub form: ProductForm,
    pub error: Option<String>,
}

impl ProductFormTemplate {
    fn new(org: &OrgPrefix, product_id: Option<ProductId>, form: ProductForm) -> Self {
        Self {
            org: org.to_string(),
            flash: None,
            product_id: product_id.map(|id| id.as_i32()),
            form,
            error: None,
        }
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    fn action(&self) -> String {
        match self.product_id {
            Some(id) => format!("/orgs/{}/merch/products/{id}/edit", self.org),
            None => format!("/orgs/{}/merch/products/new", self.org),
        }
    }
}

pub async fn new_product(Path(org): Path<OrgPrefix>) -> ProductFormTemplate {
    ProductFormTemplate::new(&org, None, ProductForm {
        stock: "0".to_string(),
        ..ProductForm::default()
    })
}

#[instrument(skip(state, session, form), fields(org = %org))]
pub async fn create_product(
    State(state): State<AppState>,
    Path(org): Path<OrgPrefix>,
    session: AdminSession,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            return Ok(ProductFormTemplate::new(&org, None, form)
                .with_error(message)
                .into_response());
        }
    };

    match state.api().create_product(&org, &input).await {
        Ok(_) => {
            tracing::info!(name = %input.name, "product created");
            session
                .flash(Flash::success("Product created successfully!"))
                .await?;
            Ok(Redirect::to(&dashboard_url(&org)).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to create product");
            Ok(ProductFormTemplate::new(&org, None, form)
                .with_error(format!("Failed to create product: {}", e.detail()))
                .into_response())
        }
    }
}

#[instrument(skip(state, session), fields(org = %org, product = %id))]
pub async fn edit_product(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrgPrefix, ProductId)>,
    session: AdminSession,
) -> Result<Response> {
    match state.api().product(&org, id).await {
        Ok(product) => Ok(
            ProductFormTemplate::new(&org, Some(id), ProductForm::from_product(&product))
                .into_response(),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load product");
            session
                .flash(Flash::error(format!(
                    "Failed to load product: {}",
                    e.detail()
                )))
                .await?;
            Ok(Redirect::to(&dashboard_url(&org)).into_response())
        }
    }
}

#[instrument(skip(state, session, form), fields(org = %org, product = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrgPrefix, ProductId)>,
    session: AdminSession,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            return Ok(ProductFormTemplate::new(&org, Some(id), form)
                .with_error(message)
                .into_response());
        }
    };

    match state.api().update_product(&org, id, &input).await {
        Ok(_) => {
            tracing::info!("product updated");
            session
                .flash(Flash::success("Product updated successfully!"))
                .await?;
            Ok(Redirect::to(&dashboard_url(&org)).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to update product");
            Ok(ProductFormTemplate::new(&org, Some(id), form)
                .with_error(format!("Failed to update product: {}", e.detail()))
                .into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn form(price: &str, stock: &str) -> ProductForm {
        ProductForm {
            name: "Hoodie".to_string(),
            price: price.to_string(),
            stock: stock.to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_validate_product_form() {
        let input = form("$35.50", " 12 ").validate().unwrap();
        assert_eq!(input.price, Price::new(Decimal::new(3550, 2)));
        assert_eq!(input.stock, 12);

        assert_eq!(
            form("-1", "3").validate().unwrap_err(),
            "Price must be a non-negative number"
        );
        assert_eq!(
            form("10", "2.5").validate().unwrap_err(),
            "Stock must be a whole number"
        );
        assert_eq!(
            ProductForm::default().validate().unwrap_err(),
            "Product name is required"
        );
    }

    #[test]
    fn test_order_row_lines() {
        let order: Order = serde_json::from_value(json!({
            "id": 7,
            "status": "processing",
            "total_amount": 20.0,
            "user_name": "Sparky",
            "items": [{"product_id": 2, "product_name": "Mug", "quantity": 2, "price_at_time": 10.0}]
        }))
        .unwrap();
        let row = OrderRow::from(&order);
        assert_eq!(row.customer, "Sparky");
        assert_eq!(row.item_count, 2);
        assert_eq!(row.lines, vec!["2 x Mug ($20.00)".to_string()]);
        assert_eq!(row.status, OrderStatus::Processing);
    }

    #[test]
    fn test_form_action() {
        let org = OrgPrefix::parse("acm").unwrap();
        let page = ProductFormTemplate::new(&org, Some(ProductId::new(4)), ProductForm::default());
        assert_eq!(page.action(), "/orgs/acm/merch/products/4/edit");
    }
}
