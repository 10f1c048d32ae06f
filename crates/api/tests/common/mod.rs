//! Shared test harness: builds the full application router (same
//! middleware stack as production) and provides request helpers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use greenlight_api::config::ServerConfig;
use greenlight_api::router::build_app_router;
use greenlight_api::state::AppState;
use greenlight_core::gate::GateLockMode;
use greenlight_core::roles::OrgRole;
use greenlight_db::models::person::CreatePerson;
use greenlight_db::repositories::PersonRepo;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        gate_lock_mode: GateLockMode::AlwaysOpen,
    }
}

/// Build the application router used by the tests, mirroring `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_config(pool, test_config())
}

/// Build the router with a custom config (for gate-lock tests).
pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Insert a person and return their id.
pub async fn seed_person(pool: &PgPool, name: &str, org_role: OrgRole) -> i64 {
    let person = PersonRepo::create(
        pool,
        &CreatePerson {
            display_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            org_role: Some(org_role),
        },
    )
    .await
    .unwrap();
    person.id
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    request(app, Method::GET, uri, None, None).await
}

/// Send a GET request with an actor header.
pub async fn get_as(app: Router, uri: &str, actor_id: i64) -> Response<Body> {
    request(app, Method::GET, uri, None, Some(actor_id)).await
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    request(app, Method::POST, uri, Some(body), None).await
}

/// Send a POST request with a JSON body and an actor header.
pub async fn post_json_as(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    actor_id: i64,
) -> Response<Body> {
    request(app, Method::POST, uri, Some(body), Some(actor_id)).await
}

/// Send a PATCH request with a JSON body.
pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    request(app, Method::PATCH, uri, Some(body), None).await
}

/// Send a PUT request with a JSON body.
pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    request(app, Method::PUT, uri, Some(body), None).await
}

/// Send a DELETE request.
pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    request(app, Method::DELETE, uri, None, None).await
}

async fn request(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    actor_id: Option<i64>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor_id) = actor_id {
        builder = builder.header("x-actor-id", actor_id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert an error response carries the expected status and error code.
pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code);
}
