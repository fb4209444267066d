//! Shared helpers for API integration tests.
//!
//! Builds the production router (same middleware stack as `main.rs`)
//! against a test database, and spawns a local stand-in for the
//! external redirect-gate provider so issuance tests run hermetically.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use adgate_api::config::ServerConfig;
use adgate_api::router::build_app_router;
use adgate_api::state::AppState;
use adgate_shortlink::{ShortlinkClient, ShortlinkConfig};

/// Operator key used by every test config.
pub const TEST_OPERATOR_KEY: &str = "test-operator-key";

/// Callback URL accepted by every test config.
pub const TEST_CALLBACK_URL: &str = "http://localhost:5173/verify-key";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        token_ttl_hours: 24,
        allowed_callback_origins: vec!["http://localhost:5173".to_string()],
        callback_path: "/verify-key".to_string(),
        admin_api_key: TEST_OPERATOR_KEY.to_string(),
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool and gate endpoint.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack (CORS, request ID, timeout,
/// tracing, panic recovery) that production uses.
pub fn build_test_app(pool: PgPool, gate_url: &str) -> Router {
    let config = test_config();
    // 500 ms is plenty for a local mock and keeps the hanging-gate test
    // fast.
    let shortlink = ShortlinkClient::new(
        ShortlinkConfig::new(gate_url, "test-gate-key")
            .request_timeout(Duration::from_millis(500)),
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        shortlink: Arc::new(shortlink),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Mock redirect gate
// ---------------------------------------------------------------------------

/// How the mock gate responds to a `shorten` call.
#[derive(Clone, Copy)]
pub enum GateBehavior {
    /// 200 with a usable short URL.
    Success,
    /// 500 with an empty body.
    Error500,
    /// 200 but no URL in the payload.
    NoUrl,
    /// Never answers within the client timeout.
    Hang,
}

/// The short URL the mock gate hands out on success.
pub const MOCK_GATE_URL: &str = "https://gate.test/go";

/// Spawn a local gate provider and return its API endpoint URL.
pub async fn spawn_gate(behavior: GateBehavior) -> String {
    let app = Router::new().route(
        "/api",
        get(move || async move {
            match behavior {
                GateBehavior::Success => Json(serde_json::json!({
                    "status": "success",
                    "shortenedUrl": MOCK_GATE_URL,
                }))
                .into_response(),
                GateBehavior::Error500 => {
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
                GateBehavior::NoUrl => {
                    Json(serde_json::json!({ "status": "success" })).into_response()
                }
                GateBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Json(serde_json::json!({ "shortenedUrl": MOCK_GATE_URL })).into_response()
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request to the app.
pub async fn get_path(app: Router, path: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a JSON POST request to the app.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a JSON POST request with a bearer key.
pub async fn post_json_auth(
    app: Router,
    path: &str,
    body: serde_json::Value,
    bearer: &str,
) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a GET request with a bearer key.
pub async fn get_auth(app: Router, path: &str, bearer: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into parsed JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
