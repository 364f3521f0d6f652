//! Shared helpers for API integration tests.
//!
//! Builds the full application router (same middleware stack as `main.rs`)
//! around a fresh in-memory registry, and provides request/response helpers.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use fieldsync_api::auth::jwt::{generate_access_token, JwtConfig};
use fieldsync_api::config::ServerConfig;
use fieldsync_api::router::build_app_router;
use fieldsync_api::state::AppState;
use fieldsync_core::{ControllerConfig, ControllerRegistry};
use fieldsync_events::EventBus;

/// Build a test `ServerConfig` with safe defaults and the given controller
/// timing.
pub fn test_config(controller: ControllerConfig) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
        controller,
    }
}

/// Build the application router with default controller timing.
pub fn build_test_app() -> Router {
    build_test_app_with(ControllerConfig::default())
}

/// Build the application router with specific controller timing, so tests
/// can shrink the stale timeout or handoff window to milliseconds.
pub fn build_test_app_with(controller: ControllerConfig) -> Router {
    let config = test_config(controller.clone());
    let state = AppState {
        registry: Arc::new(ControllerRegistry::new(controller)),
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
    };
    build_app_router(state, &config)
}

/// Mint a bearer token for `user_id` with the test secret.
pub fn auth_token(user_id: &str, display_name: &str) -> String {
    let jwt = JwtConfig {
        secret: "test-secret".to_string(),
        access_token_expiry_mins: 60,
    };
    generate_access_token(user_id, display_name, &jwt).expect("token generation")
}

/// Send a GET request with a bearer token.
pub async fn get(app: &Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Send a POST request with a bearer token and an optional JSON body.
pub async fn post(
    app: &Router,
    path: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        })
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Send a DELETE request with a bearer token.
pub async fn delete(app: &Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Assert status and return the body JSON in one step.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
