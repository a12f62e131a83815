//! End-to-end test harness for Campus Points.
//!
//! Each test starts an in-process fake of the points API on an ephemeral
//! port, then the storefront or admin application pointed at it. The fake
//! records every request so tests can assert on what was (or was not) sent.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p campus-points-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use url::Url;

/// Header the storefront uses to identify a form-logged-in member.
const MEMBER_HEADER: &str = "x-member-user-id";

/// Cookie the fake API treats as a live OAuth provider session.
pub const PROVIDER_COOKIE: &str = "provider_session=ok";

/// Admin token accepted by config validation.
pub const ADMIN_TOKEN: &str = "q8Zr2LwP0xNc7VtKb4HyMs1JdFgA";

/// One request received by the fake API.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// Decoded path segments joined with `/`.
    pub path: String,
    pub body: Value,
    /// Forwarded `Cookie` header, if any.
    pub cookie: Option<String>,
    /// `X-Member-User-Id` header, if any.
    pub member_id: Option<String>,
}

#[derive(Default)]
struct FakeState {
    requests: Mutex<Vec<Recorded>>,
    fail_orders: AtomicBool,
    fail_member_store: AtomicBool,
    fail_public_store: AtomicBool,
}

/// Handle to a running fake points API.
#[derive(Clone)]
pub struct FakeApi {
    state: Arc<FakeState>,
    url: Url,
}

impl FakeApi {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));
        let addr = serve(app).await;
        Self {
            state,
            url: Url::parse(&format!("http://{addr}/")).unwrap(),
        }
    }

    #[must_use]
    pub fn url(&self) -> Url {
        self.url.clone()
    }

    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests matching a method and exact path.
    #[must_use]
    pub fn calls(&self, method: &Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Make the merch orders list fail with a 500.
    pub fn fail_orders(&self) {
        self.state.fail_orders.store(true, Ordering::SeqCst);
    }

    /// Make the member catalog fail with a 500.
    pub fn fail_member_store(&self) {
        self.state.fail_member_store.store(true, Ordering::SeqCst);
    }

    /// Make the public catalog fail with a 500.
    pub fn fail_public_store(&self) {
        self.state.fail_public_store.store(true, Ordering::SeqCst);
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Start the storefront against `api`; returns its base URL.
pub async fn start_storefront(api: &FakeApi) -> String {
    use campus_points_storefront::{app, config::StorefrontConfig, state::AppState};

    let state = AppState::new(StorefrontConfig::for_api(api.url())).unwrap();
    format!("http://{}", serve(app(state)).await)
}

/// Start the admin console against `api`; returns its base URL.
pub async fn start_admin(api: &FakeApi) -> String {
    use campus_points_admin::{app, config::AdminConfig, state::AppState};

    let state = AppState::new(AdminConfig::for_api(api.url(), ADMIN_TOKEN)).unwrap();
    format!("http://{}", serve(app(state)).await)
}

/// Browser-like client that keeps cookies and follows redirects.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().unwrap()
}

/// Browser that keeps cookies but stops at redirects.
#[must_use]
pub fn browser_without_redirects() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Browser already holding an OAuth provider session cookie for `base`.
#[must_use]
pub fn provider_browser(base: &str) -> reqwest::Client {
    let jar = reqwest::cookie::Jar::default();
    jar.add_cookie_str(PROVIDER_COOKIE, &base.parse().unwrap());
    reqwest::Client::builder()
        .cookie_provider(Arc::new(jar))
        .build()
        .unwrap()
}

// =============================================================================
// Fake API
// =============================================================================

fn products() -> Value {
    json!([
        {"id": 1, "name": "Hoodie", "price": 35.0, "stock": 2, "description": "Warm", "image_url": null},
        {"id": 2, "name": "Sticker", "price": 1.5, "stock": 100},
        {"id": 3, "name": "Mug", "price": 12.0, "stock": 5}
    ])
}

fn orders() -> Value {
    json!([
        {"id": 10, "status": "pending", "total_amount": 0.1, "items": [],
         "created_at": "2024-03-01T12:00:00", "user_name": "Ada"},
        {"id": 11, "status": "shipped", "total_amount": 0.2,
         "items": [{"id": 1, "product_id": 2, "product_name": "Sticker", "quantity": 2, "price_at_time": 0.1}]}
    ])
}

fn oauth_summary() -> Value {
    json!({
        "total_organizations": 2,
        "oauth_enabled_count": 1,
        "oauth_configured_count": 1,
        "organizations_with_domains": 1,
        "organizations_with_callbacks": 1,
        "organizations_details": [
            {"id": 1, "name": "ACM", "prefix": "acm", "oauth_enabled": true,
             "oauth_callback_url": "https://acm.example.edu/callback",
             "allowed_domains": ["asu.edu"], "storefront_enabled": true, "is_active": true},
            {"id": 2, "name": "IEEE", "prefix": "ieee", "oauth_enabled": false,
             "oauth_callback_url": null, "allowed_domains": null,
             "storefront_enabled": false, "is_active": true}
        ]
    })
}

fn product(id: &str) -> Option<Value> {
    products()
        .as_array()
        .and_then(|all| all.iter().find(|p| p["id"].to_string() == id))
        .cloned()
}

/// Validation of the stored ACM configuration.
fn oauth_test_report() -> Value {
    json!({
        "organization": "ACM",
        "oauth_config": {
            "oauth_enabled": true,
            "has_callback_url": true,
            "has_allowed_domains": true,
            "domains_count": 2,
            "callback_url_valid": false,
            "callback_url_error": "Callback URL must use HTTPS",
            "valid_domains": ["asu.edu"],
            "invalid_domains": ["bad domain"],
            "all_domains_valid": false
        }
    })
}

fn user_detail(email: &str) -> Option<Value> {
    (email == "a@asu.edu").then(|| {
        json!({
            "user": {"name": "Ada", "username": "ada", "email": email, "asu_id": "1200000001",
                     "academic_standing": "Junior", "major": "CS"},
            "total_points": 50.0,
            "points_history": [
                {"id": 1, "event": "GBM 1", "points": 30.0, "timestamp": "2024-02-01T18:00:00",
                 "awarded_by_officer": "Officer"},
                {"id": 2, "event": "Workshop", "points": 20.0, "timestamp": "2024-02-08T18:00:00"},
                {"id": 3, "event": null, "points": 0.0}
            ]
        })
    })
}

fn json_status(status: StatusCode, body: Value) -> Response {
    (status, axum::Json(body)).into_response()
}

fn ok(body: Value) -> Response {
    json_status(StatusCode::OK, body)
}

fn failed(flag: &AtomicBool, message: &str) -> Option<Response> {
    flag.load(Ordering::SeqCst).then(|| {
        json_status(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": message}))
    })
}

async fn handle(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let segments: Vec<String> = uri
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::decode(s).map_or_else(|_| s.to_string(), |d| d.into_owned()))
        .collect();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let cookie = header("cookie");
    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: segments.join("/"),
        body: body.clone(),
        cookie: cookie.clone(),
        member_id: header(MEMBER_HEADER),
    });

    let provider = cookie
        .as_deref()
        .is_some_and(|c| c.split("; ").any(|pair| pair == PROVIDER_COOKIE));
    let member = headers.contains_key(MEMBER_HEADER) || provider;
    let parts: Vec<&str> = segments.iter().map(String::as_str).collect();

    match (method.as_str(), parts.as_slice()) {
        // Storefront
        ("POST", ["api", "points", org, "member_login"]) => ok(json!({
            "message": "Login successful",
            "user": {"id": 7, "name": body["name"], "email": body["email"], "asu_id": body["asu_id"]},
            "organization": {"id": 1, "name": org.to_uppercase(), "prefix": org}
        })),
        ("GET", ["api", "points", org, "member_profile"]) if member => ok(json!({
            "user": {"name": "Sparky", "asu_id": "1200000000"},
            "current_organization": {"name": org.to_uppercase(), "prefix": org, "points": 50.0},
            "organizations": [],
            "total_points_all_orgs": 50.0
        })),
        ("GET", ["api", "merch", org, "store"]) => failed(&state.fail_public_store, "Catalog offline")
            .unwrap_or_else(|| {
                ok(json!({
                    "organization": {"name": org.to_uppercase(), "prefix": org},
                    "products": products()
                }))
            }),
        ("GET", ["api", "merch", org, "members", "store"]) if member => {
            failed(&state.fail_member_store, "Member catalog offline").unwrap_or_else(|| {
                ok(json!({
                    "organization": {"name": org.to_uppercase(), "prefix": org, "description": "Members only"},
                    "products": products()
                }))
            })
        }
        ("GET", ["api", "merch", _, "members", "orders"]) if member => ok(json!([])),
        ("POST", ["api", "merch", _, "members", "orders"]) if member => json_status(
            StatusCode::CREATED,
            json!({"message": "Order created", "id": 99}),
        ),
        (_, ["api", "merch", _, "members", ..]) | ("GET", ["api", "points", _, "member_profile"]) => {
            json_status(StatusCode::UNAUTHORIZED, json!({"error": "Not authenticated"}))
        }

        // Points
        ("GET", ["api", "public", _, "leaderboard"]) => ok(json!({
            "leaderboard": [
                {"email": "a@asu.edu", "name": "Ada", "asu_id": "1200000001", "total_points": 50.0},
                {"email": "b@asu.edu", "name": null, "total_points": 80.0}
            ]
        })),
        ("GET", ["api", "points", _, "users", email, "points"]) => match user_detail(email) {
            Some(detail) => ok(detail),
            None => json_status(StatusCode::NOT_FOUND, json!({"error": "User not found"})),
        },
        ("PUT", ["api", "points", _, "users", _]) => ok(json!({"message": "User updated"})),
        ("POST", ["api", "points", _, "users"]) => {
            json_status(StatusCode::CREATED, json!({"message": "User created"}))
        }
        ("DELETE", ["api", "points", _, "delete_points"]) => {
            ok(json!({"message": format!("Deleted {} points", body["event"].as_str().unwrap_or_default())}))
        }

        // Superadmin
        ("GET", ["api", "superadmin", "organizations", "oauth", "summary"]) => ok(oauth_summary()),
        ("GET", ["api", "superadmin", "organizations", _, "oauth"]) => ok(json!({
            "oauth_enabled": true,
            "oauth_callback_url": "https://acm.example.edu/callback",
            "allowed_domains": ["asu.edu"]
        })),
        ("POST", ["api", "superadmin", "organizations", "1", "oauth", "test"]) => {
            ok(oauth_test_report())
        }
        ("POST", ["api", "superadmin", "organizations", _, "oauth", "test"]) => {
            json_status(StatusCode::NOT_FOUND, json!({"error": "Organization not found"}))
        }
        ("PUT", ["api", "superadmin", "organizations", id, "oauth"]) => ok(json!({
            "message": "OAuth settings updated",
            "organization": {
                "id": id.parse::<i32>().unwrap_or_default(), "name": "ACM", "prefix": "acm",
                "oauth_enabled": body["oauth_enabled"],
                "oauth_callback_url": body["oauth_callback_url"],
                "allowed_domains": body["allowed_domains"],
                "storefront_enabled": true, "is_active": true
            }
        })),

        // Merch admin
        ("GET", ["api", "merch", _, "products"]) => ok(products()),
        ("GET", ["api", "merch", _, "products", id]) => match product(id) {
            Some(product) => ok(product),
            None => json_status(StatusCode::NOT_FOUND, json!({"error": "Product not found"})),
        },
        ("POST", ["api", "merch", _, "products"]) => {
            json_status(StatusCode::CREATED, json!({"message": "Product created"}))
        }
        ("PUT", ["api", "merch", _, "products", _]) => ok(json!({"message": "Product updated"})),
        ("GET", ["api", "merch", _, "orders"]) => {
            failed(&state.fail_orders, "Database unavailable").unwrap_or_else(|| ok(orders()))
        }
        ("PUT", ["api", "merch", _, "orders", _]) => ok(json!({"message": "Order updated"})),
        ("DELETE", ["api", "merch", _, "products", _]) => ok(json!({"message": "Product deleted"})),

        _ => json_status(StatusCode::NOT_FOUND, json!({"error": "Not found"})),
    }
}
