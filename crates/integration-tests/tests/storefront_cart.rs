//! Storefront cart, checkout and login flows against the fake points API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use campus_points_integration_tests::{FakeApi, browser, start_storefront};
use reqwest::{Client, Method};
use serde_json::json;

async fn login(client: &Client, base: &str) {
    let body = client
        .post(format!("{base}/store/acm/login"))
        .form(&[("name", "Sparky"), ("asu_id", "1200000000"), ("email", "")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Login successful!"), "{body}");
}

async fn add(client: &Client, base: &str, org: &str, product_id: u32) -> String {
    client
        .post(format!("{base}/store/{org}/cart/add"))
        .form(&[("product_id", product_id.to_string())])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap()
}

async fn page(client: &Client, url: String) -> String {
    client.get(url).send().await.unwrap().text().await.unwrap()
}

#[tokio::test]
async fn test_login_omits_blank_optional_fields() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;
    let client = browser();

    login(&client, &base).await;

    let calls = api.calls(&Method::POST, "api/points/acm/member_login");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].body,
        json!({"name": "Sparky", "asu_id": "1200000000"})
    );
}

#[tokio::test]
async fn test_cart_persists_and_clamps_to_stock() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;
    let client = browser();

    assert!(add(&client, &base, "acm", 1).await.contains("Added Hoodie to cart"));
    add(&client, &base, "acm", 1).await;
    let third = add(&client, &base, "acm", 1).await;
    assert!(third.contains("Only 2 items available in stock"), "{third}");

    let cart = page(&client, format!("{base}/store/acm?tab=cart")).await;
    assert!(cart.contains("Hoodie"));
    assert!(cart.contains(r#"name="quantity" value="2""#), "{cart}");
    assert!(cart.contains("$70.00"));
}

#[tokio::test]
async fn test_switching_org_clears_previous_cart() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;
    let client = browser();

    add(&client, &base, "acm", 2).await;
    assert!(page(&client, format!("{base}/store/acm?tab=cart")).await.contains("Sticker"));

    page(&client, format!("{base}/store/ieee")).await;

    let cart = page(&client, format!("{base}/store/acm?tab=cart")).await;
    assert!(cart.contains("Your cart is empty."), "{cart}");
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;
    let client = browser();

    add(&client, &base, "acm", 2).await;
    let body = client
        .post(format!("{base}/store/acm/checkout"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Please login to place an order"), "{body}");
    assert!(api.calls(&Method::POST, "api/merch/acm/members/orders").is_empty());
}

#[tokio::test]
async fn test_checkout_posts_captured_prices_and_clears_cart() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;
    let client = browser();

    login(&client, &base).await;
    add(&client, &base, "acm", 2).await;
    add(&client, &base, "acm", 2).await;

    let body = client
        .post(format!("{base}/store/acm/checkout"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Order placed successfully!"), "{body}");

    let orders = api.calls(&Method::POST, "api/merch/acm/members/orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(
        orders[0].body,
        json!({
            "total_amount": 3.0,
            "items": [{"product_id": 2, "quantity": 2, "price": 1.5}]
        })
    );

    let cart = page(&client, format!("{base}/store/acm?tab=cart")).await;
    assert!(cart.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_empty_cart_checkout_is_rejected() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;
    let client = browser();

    login(&client, &base).await;
    let body = client
        .post(format!("{base}/store/acm/checkout"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Your cart is empty"));
    assert!(api.calls(&Method::POST, "api/merch/acm/members/orders").is_empty());
}

#[tokio::test]
async fn test_logout_clears_cart() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;
    let client = browser();

    login(&client, &base).await;
    add(&client, &base, "acm", 3).await;

    let body = client
        .post(format!("{base}/store/acm/logout"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Logged out successfully"));

    let cart = page(&client, format!("{base}/store/acm?tab=cart")).await;
    assert!(cart.contains("Your cart is empty."));
}
