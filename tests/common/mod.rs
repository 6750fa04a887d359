//! Shared helpers for integration tests
//!
//! Every test runs the real router in-process against a WireMock server that
//! stands in for the exchange.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use gateio_proxy::proxy::upstream::{ApiCredentials, TimeSource, UpstreamClient};
use gateio_proxy::{build_router, AppState, ProxyConfig};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-key";
pub const TEST_API_SECRET: &str = "test-secret";

/// Config pointing at a mock exchange
pub fn test_config(base_url: &str) -> ProxyConfig {
    ProxyConfig {
        base_url: base_url.to_string(),
        request_timeout: 2,
        ..ProxyConfig::default()
    }
}

pub fn build_app(config: ProxyConfig) -> Router {
    let upstream = UpstreamClient::new(
        &config,
        ApiCredentials::new(TEST_API_KEY, TEST_API_SECRET),
    )
    .expect("client should build");
    build_router(AppState::new(config, upstream))
}

pub fn build_test_app(base_url: &str) -> Router {
    build_app(test_config(base_url))
}

pub fn build_test_app_with_time_source(base_url: &str, time_source: TimeSource) -> Router {
    build_app(ProxyConfig {
        time_source,
        ..test_config(base_url)
    })
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send one request and decode the JSON response body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
