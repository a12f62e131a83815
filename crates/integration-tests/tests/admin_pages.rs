//! Admin console pages against the fake points API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use campus_points_integration_tests::{FakeApi, browser, browser_without_redirects, start_admin};
use reqwest::header::LOCATION;
use reqwest::{Method, StatusCode};
use serde_json::json;

async fn get(client: &reqwest::Client, url: String) -> String {
    let response = client.get(url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.text().await.unwrap()
}

// =============================================================================
// Leaderboard
// =============================================================================

#[tokio::test]
async fn test_leaderboard_ranks_in_server_order() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = get(&browser(), format!("{base}/orgs/acm/leaderboard")).await;

    let first = body.find("#1").unwrap();
    let ada = body.find("a@asu.edu").unwrap();
    let second = body.find("#2").unwrap();
    let b = body.find("b@asu.edu").unwrap();
    assert!(first < ada && ada < second && second < b);
}

#[tokio::test]
async fn test_cancelling_points_delete_makes_no_call() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;
    let client = browser();

    let confirm = get(
        &client,
        format!("{base}/orgs/acm/leaderboard?user=a%40asu.edu&confirm=GBM%201"),
    )
    .await;
    assert!(confirm.contains("Delete the points for <strong>GBM 1</strong>?"));

    // Cancel is a plain link back to the modal.
    get(&client, format!("{base}/orgs/acm/leaderboard?user=a%40asu.edu")).await;

    assert!(
        api.requests()
            .iter()
            .all(|r| r.method != Method::DELETE)
    );
}

#[tokio::test]
async fn test_confirmed_points_delete() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!(
            "{base}/orgs/acm/leaderboard/users/a%40asu.edu/points/delete"
        ))
        .form(&[("event", "GBM 1")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Deleted GBM 1 points"), "{body}");

    let calls = api.calls(&Method::DELETE, "api/points/acm/delete_points");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].body,
        json!({"user_email": "a@asu.edu", "event": "GBM 1"})
    );
}

#[tokio::test]
async fn test_history_without_event_has_no_delete_link() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = get(&browser(), format!("{base}/orgs/acm/leaderboard?user=a%40asu.edu")).await;

    assert!(body.contains("No event specified"), "{body}");
    assert_eq!(body.matches(">Delete</a>").count(), 2);
    assert!(!body.contains("confirm=\""));
}

#[tokio::test]
async fn test_leaderboard_edit_sends_username() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!("{base}/orgs/acm/leaderboard/users/a%40asu.edu"))
        .form(&[
            ("name", "Ada L"),
            ("username", "ada"),
            ("asu_id", "1200000001"),
            ("academic_standing", "Senior"),
            ("major", "CS"),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("User information updated"));

    let calls = api.calls(&Method::PUT, "api/points/acm/users/a@asu.edu");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body["username"], "ada");
    assert_eq!(calls[0].body["academic_standing"], "Senior");
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_user_search_not_found_offers_blank_form() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = get(&browser(), format!("{base}/orgs/acm/users?email=new%40asu.edu")).await;

    assert!(body.contains("User not found. You can create this user"));
    assert!(body.contains(r#"name="current_email" value="new@asu.edu""#));
    assert!(body.contains(r#"name="name" value="""#));
}

#[tokio::test]
async fn test_user_search_blank_email() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = get(&browser(), format!("{base}/orgs/acm/users?email=%20")).await;

    assert!(body.contains("Please enter an email to search."));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_user_update_uses_captured_email() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!("{base}/orgs/acm/users/update"))
        .form(&[
            ("current_email", "a@asu.edu"),
            ("name", "Ada"),
            ("asu_id", ""),
            ("academic_standing", ""),
            ("major", "Math"),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("User updated"));

    let calls = api.calls(&Method::PUT, "api/points/acm/users/a@asu.edu");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].body,
        json!({"name": "Ada", "asu_id": "", "academic_standing": "", "major": "Math"})
    );
}

#[tokio::test]
async fn test_user_create_omits_blank_optionals() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!("{base}/orgs/acm/users/create"))
        .form(&[
            ("email", "new@asu.edu"),
            ("name", "New Member"),
            ("asu_id", ""),
            ("academic_standing", ""),
            ("major", ""),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("User created"));

    let calls = api.calls(&Method::POST, "api/points/acm/users");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].body,
        json!({"email": "new@asu.edu", "name": "New Member"})
    );
}

#[tokio::test]
async fn test_user_create_requires_email_and_name() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!("{base}/orgs/acm/users/create"))
        .form(&[("email", "new@asu.edu"), ("name", " ")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Email and name are required for creating a user."));
    assert!(api.calls(&Method::POST, "api/points/acm/users").is_empty());
}

// =============================================================================
// OAuth
// =============================================================================

#[tokio::test]
async fn test_summary_toggle_renders_from_cache() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;
    let client = browser();
    let summary_path = "api/superadmin/organizations/oauth/summary";

    let body = get(&client, format!("{base}/superadmin/oauth/summary")).await;
    assert!(!body.contains("https://acm.example.edu/callback"));
    assert_eq!(api.calls(&Method::GET, summary_path).len(), 1);

    let expanded = client
        .post(format!("{base}/superadmin/oauth/summary/toggle/1"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(expanded.contains("https://acm.example.edu/callback"));

    let collapsed = client
        .post(format!("{base}/superadmin/oauth/summary/toggle/1"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!collapsed.contains("https://acm.example.edu/callback"));

    assert_eq!(api.calls(&Method::GET, summary_path).len(), 1);
}

#[tokio::test]
async fn test_oauth_add_duplicate_domain_makes_no_call() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!("{base}/superadmin/organizations/1/oauth"))
        .form(&[
            ("oauth_enabled", "true"),
            ("oauth_callback_url", "https://acm.example.edu/callback"),
            ("allowed_domains", "asu.edu"),
            ("new_domain", " asu.edu "),
            ("action", "add"),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(body.matches("<span>asu.edu</span>").count(), 1);
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_oauth_save_sends_draft() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!("{base}/superadmin/organizations/1/oauth"))
        .form(&[
            ("oauth_callback_url", "https://acm.example.edu/callback"),
            ("allowed_domains", "asu.edu\npartner.edu"),
            ("new_domain", ""),
            ("action", "save"),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("OAuth settings updated"));

    let calls = api.calls(&Method::PUT, "api/superadmin/organizations/1/oauth");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].body,
        json!({
            "oauth_enabled": false,
            "oauth_callback_url": "https://acm.example.edu/callback",
            "allowed_domains": ["asu.edu", "partner.edu"]
        })
    );
}

#[tokio::test]
async fn test_oauth_test_reports_each_check() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!("{base}/superadmin/organizations/1/oauth"))
        .form(&[
            ("oauth_enabled", "true"),
            ("oauth_callback_url", "http://acm.example.edu/callback"),
            ("allowed_domains", "asu.edu\nbad domain"),
            ("new_domain", ""),
            ("action", "test"),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Configuration Test: ACM"), "{body}");
    assert!(body.contains("Needs Attention"));
    assert!(body.contains("Invalid"));
    assert!(body.contains("Callback URL must use HTTPS"));
    assert!(body.contains(r#"<span class="pill ok">asu.edu</span>"#));
    assert!(body.contains(r#"<span class="pill bad">bad domain</span>"#));

    assert_eq!(
        api.calls(&Method::POST, "api/superadmin/organizations/1/oauth/test").len(),
        1
    );
    assert!(api.calls(&Method::PUT, "api/superadmin/organizations/1/oauth").is_empty());
}

#[tokio::test]
async fn test_failed_oauth_test_keeps_draft() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!("{base}/superadmin/organizations/2/oauth"))
        .form(&[
            ("oauth_enabled", "true"),
            ("oauth_callback_url", "https://ieee.example.edu/cb"),
            ("allowed_domains", "partner.edu"),
            ("new_domain", "draft.edu"),
            ("action", "test"),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Failed to test OAuth configuration"), "{body}");
    assert!(body.contains("<span>partner.edu</span>"));
    assert!(body.contains(r#"value="https://ieee.example.edu/cb""#));
    assert!(body.contains(r#"value="draft.edu""#));
    assert!(!body.contains("Configuration Test:"));
}

// =============================================================================
// Merchandise
// =============================================================================

#[tokio::test]
async fn test_merch_dashboard_stats() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = get(&browser(), format!("{base}/orgs/acm/merch")).await;

    assert!(body.contains(r#"<span class="label">Products</span><span class="value">3</span>"#));
    assert!(body.contains(r#"<span class="label">Revenue</span><span class="value">$0.30</span>"#));
    assert!(body.contains(r#"<span class="label">Low Stock</span><span class="value">2</span>"#));
}

#[tokio::test]
async fn test_merch_dashboard_fails_as_a_whole() {
    let api = FakeApi::start().await;
    api.fail_orders();
    let base = start_admin(&api).await;

    let body = get(&browser(), format!("{base}/orgs/acm/merch")).await;

    assert!(body.contains("Failed to fetch data. Database unavailable"));
    assert!(!body.contains("Hoodie"));
}

#[tokio::test]
async fn test_order_status_update() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!("{base}/orgs/acm/merch/orders/10/status"))
        .form(&[("status", "shipped")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Order status updated successfully!"));

    let calls = api.calls(&Method::PUT, "api/merch/acm/orders/10");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body, json!({"status": "shipped"}));
}

#[tokio::test]
async fn test_edit_product_prefills_form() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = get(&browser(), format!("{base}/orgs/acm/merch/products/1/edit")).await;

    assert!(body.contains(r#"value="Hoodie""#), "{body}");
    assert!(body.contains(r#"value="35.00""#));
    assert!(body.contains(r#"action="/orgs/acm/merch/products/1/edit""#));
    assert_eq!(api.calls(&Method::GET, "api/merch/acm/products/1").len(), 1);
}

#[tokio::test]
async fn test_edit_missing_product_returns_to_dashboard() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = get(&browser(), format!("{base}/orgs/acm/merch/products/9/edit")).await;

    assert!(body.contains("Failed to load product: Product not found"), "{body}");
}

#[tokio::test]
async fn test_update_product_puts_validated_body() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;
    let client = browser_without_redirects();

    let response = client
        .post(format!("{base}/orgs/acm/merch/products/1/edit"))
        .form(&[
            ("name", " Hoodie "),
            ("price", "$30.50"),
            ("stock", "4"),
            ("description", "Warmer"),
            ("image_url", ""),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/orgs/acm/merch");

    let calls = api.calls(&Method::PUT, "api/merch/acm/products/1");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].body,
        json!({"name": "Hoodie", "price": 30.5, "stock": 4, "description": "Warmer", "image_url": ""})
    );

    let dashboard = get(&client, format!("{base}/orgs/acm/merch")).await;
    assert!(dashboard.contains("Product updated successfully!"));
}

#[tokio::test]
async fn test_invalid_product_update_makes_no_call() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!("{base}/orgs/acm/merch/products/1/edit"))
        .form(&[("name", "Hoodie"), ("price", "-1"), ("stock", "4")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Price must be a non-negative number"));
    assert!(body.contains(r#"value="-1""#));
    assert!(api.calls(&Method::PUT, "api/merch/acm/products/1").is_empty());
}

#[tokio::test]
async fn test_create_product_posts_body() {
    let api = FakeApi::start().await;
    let base = start_admin(&api).await;

    let body = browser()
        .post(format!("{base}/orgs/acm/merch/products/new"))
        .form(&[
            ("name", "Lanyard"),
            ("price", "2"),
            ("stock", "40"),
            ("description", ""),
            ("image_url", "https://cdn.example.edu/lanyard.png"),
        ])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Product created successfully!"), "{body}");

    let calls = api.calls(&Method::POST, "api/merch/acm/products");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].body,
        json!({
            "name": "Lanyard", "price": 2.0, "stock": 40, "description": "",
            "image_url": "https://cdn.example.edu/lanyard.png"
        })
    );
}
