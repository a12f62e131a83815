//! Storefront sign-in paths and catalog loading against the fake points API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use campus_points_integration_tests::{
    FakeApi, PROVIDER_COOKIE, browser, browser_without_redirects, provider_browser,
    start_storefront,
};
use reqwest::header::LOCATION;
use reqwest::{Client, Method, StatusCode};
use serde_json::json;

async fn page(client: &Client, url: String) -> String {
    client.get(url).send().await.unwrap().text().await.unwrap()
}

// =============================================================================
// Organization OAuth
// =============================================================================

#[tokio::test]
async fn test_oauth_return_resumes_pending_store() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;
    let client = browser_without_redirects();

    let handoff = client
        .get(format!("{base}/store/acm/login/oauth"))
        .send()
        .await
        .unwrap();
    assert_eq!(handoff.status(), StatusCode::SEE_OTHER);
    let entry = handoff.headers()[LOCATION].to_str().unwrap();
    assert!(entry.starts_with("/auth?next="), "{entry}");
    assert!(entry.ends_with("%2Fstore%2Fauth%2Freturn"), "{entry}");

    let back = client
        .get(format!("{base}/store/auth/return"))
        .send()
        .await
        .unwrap();
    assert_eq!(back.status(), StatusCode::SEE_OTHER);
    assert_eq!(back.headers()[LOCATION], "/store/acm");

    // The stash is consumed by the first return.
    let again = client
        .get(format!("{base}/store/auth/return"))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oauth_return_without_handoff() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;

    let response = browser_without_redirects()
        .get(format!("{base}/store/auth/return"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(api.requests().is_empty());
}

// =============================================================================
// Provider session
// =============================================================================

#[tokio::test]
async fn test_provider_session_authenticates_store_and_checkout() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;
    let client = provider_browser(&base);

    let store = page(&client, format!("{base}/store/acm")).await;
    assert!(store.contains("Signed in with organization"), "{store}");
    assert!(store.contains("Sparky"));

    let auth_checks = api.calls(&Method::GET, "api/merch/acm/members/orders");
    assert_eq!(auth_checks.len(), 1);
    assert_eq!(auth_checks[0].member_id, None);

    client
        .post(format!("{base}/store/acm/cart/add"))
        .form(&[("product_id", "2")])
        .send()
        .await
        .unwrap();
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
    assert_eq!(orders[0].member_id, None);
    assert_eq!(orders[0].cookie.as_deref(), Some(PROVIDER_COOKIE));
    assert_eq!(
        orders[0].body,
        json!({
            "total_amount": 1.5,
            "items": [{"product_id": 2, "quantity": 1, "price": 1.5}]
        })
    );
}

#[tokio::test]
async fn test_without_provider_session_browsing_is_anonymous() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;

    let store = page(&browser(), format!("{base}/store/acm")).await;
    assert!(!store.contains("Signed in with organization"));
    assert!(store.contains(r#"href="/store/acm/login">Login</a>"#));
    assert!(api.calls(&Method::GET, "api/points/acm/member_profile").is_empty());
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_member_catalog_falls_back_to_public() {
    let api = FakeApi::start().await;
    api.fail_member_store();
    let base = start_storefront(&api).await;
    let client = provider_browser(&base);

    let store = page(&client, format!("{base}/store/acm")).await;
    assert!(store.contains("Hoodie"), "{store}");
    assert!(!store.contains("Members only"));
    assert_eq!(api.calls(&Method::GET, "api/merch/acm/members/store").len(), 1);
    assert_eq!(api.calls(&Method::GET, "api/merch/acm/store").len(), 1);
}

#[tokio::test]
async fn test_member_catalog_preferred() {
    let api = FakeApi::start().await;
    let base = start_storefront(&api).await;

    let store = page(&provider_browser(&base), format!("{base}/store/acm")).await;
    assert!(store.contains("Members only"), "{store}");
    assert!(api.calls(&Method::GET, "api/merch/acm/store").is_empty());
}

#[tokio::test]
async fn test_store_error_page_when_both_catalogs_fail() {
    let api = FakeApi::start().await;
    api.fail_member_store();
    api.fail_public_store();
    let base = start_storefront(&api).await;

    let store = page(&provider_browser(&base), format!("{base}/store/acm")).await;
    assert!(store.contains("Failed to load store. Catalog offline"), "{store}");
    assert!(!store.contains("Hoodie"));
}
