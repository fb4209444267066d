//! Integration tests for the operator endpoints.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

use adgate_core::device::generate_device_id;
use adgate_db::repositories::AccessTokenRepo;

use common::{
    body_json, get_auth, post_json, post_json_auth, spawn_gate, GateBehavior,
    TEST_CALLBACK_URL, TEST_OPERATOR_KEY,
};

/// Issue a token and return the created row's id.
async fn issue_and_fetch_id(app: axum::Router, pool: &PgPool, device_id: &str) -> i64 {
    let response = post_json(
        app,
        "/api/v1/keys/issue",
        serde_json::json!({
            "device_id": device_id,
            "callback_url": TEST_CALLBACK_URL,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let history = AccessTokenRepo::list_by_device(pool, device_id).await.unwrap();
    history[0].id
}

// ---------------------------------------------------------------------------
// Test: revocation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn revoked_token_fails_validation(pool: PgPool) {
    let gate = spawn_gate(GateBehavior::Success).await;
    let app = common::build_test_app(pool.clone(), &gate);
    let device = generate_device_id();

    let response = post_json(
        app.clone(),
        "/api/v1/keys/issue",
        serde_json::json!({
            "device_id": device,
            "callback_url": TEST_CALLBACK_URL,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let token = body_json(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let id = AccessTokenRepo::list_by_device(&pool, &device).await.unwrap()[0].id;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/admin/keys/{id}/revoke"),
        serde_json::json!({}),
        TEST_OPERATOR_KEY,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "revoked");
    // The serialized row must never expose the hash.
    assert!(json["data"]["token_hash"].is_null());

    let response = post_json(
        app,
        "/api/v1/keys/validate",
        serde_json::json!({ "token": token, "device_id": device }),
    )
    .await;
    let verdict = body_json(response).await["data"].clone();
    assert_eq!(verdict["valid"], false);
    assert!(verdict["expires_at"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn revoke_unknown_id_returns_404(pool: PgPool) {
    let gate = spawn_gate(GateBehavior::Success).await;
    let app = common::build_test_app(pool, &gate);

    let response = post_json_auth(
        app,
        "/api/v1/admin/keys/987654/revoke",
        serde_json::json!({}),
        TEST_OPERATOR_KEY,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn revoke_requires_the_operator_key(pool: PgPool) {
    let gate = spawn_gate(GateBehavior::Success).await;
    let app = common::build_test_app(pool.clone(), &gate);
    let device = generate_device_id();
    let id = issue_and_fetch_id(app.clone(), &pool, &device).await;

    // No Authorization header at all.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/admin/keys/{id}/revoke"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong key.
    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/keys/{id}/revoke"),
        serde_json::json!({}),
        "wrong-key",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: device history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn device_history_lists_all_issued_tokens(pool: PgPool) {
    let gate = spawn_gate(GateBehavior::Success).await;
    let app = common::build_test_app(pool.clone(), &gate);
    let device = generate_device_id();

    issue_and_fetch_id(app.clone(), &pool, &device).await;
    issue_and_fetch_id(app.clone(), &pool, &device).await;

    let response = get_auth(
        app,
        &format!("/api/v1/admin/devices/{device}/keys"),
        TEST_OPERATOR_KEY,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let keys = json["data"].as_array().unwrap();
    assert_eq!(keys.len(), 2);
    for key in keys {
        assert_eq!(key["state"], "pending");
        assert!(key["token_prefix"].is_string());
        assert!(key["token_hash"].is_null(), "hash must never be exposed");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn device_history_rejects_malformed_device_id(pool: PgPool) {
    let gate = spawn_gate(GateBehavior::Success).await;
    let app = common::build_test_app(pool, &gate);

    let response = get_auth(
        app,
        "/api/v1/admin/devices/not-hex/keys",
        TEST_OPERATOR_KEY,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
