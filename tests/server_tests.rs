//! Server lifecycle over a real socket.

mod common;

use common::*;
use gateio_proxy::proxy::upstream::{ApiCredentials, UpstreamClient};
use gateio_proxy::{AppError, AxumServer, ProxyConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local_config(base_url: &str) -> ProxyConfig {
    ProxyConfig {
        host: "127.0.0.1".into(),
        port: 0,
        ..test_config(base_url)
    }
}

fn client(config: &ProxyConfig) -> UpstreamClient {
    UpstreamClient::new(config, ApiCredentials::new(TEST_API_KEY, TEST_API_SECRET)).unwrap()
}

#[tokio::test]
async fn test_server_serves_and_stops() {
    let exchange = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/spot/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"currency": "BTC", "available": "2", "locked": "1"}
        ])))
        .expect(1)
        .mount(&exchange)
        .await;

    let config = local_config(&exchange.uri());
    let upstream = client(&config);
    let (server, handle) = AxumServer::start(config, upstream).await.unwrap();
    let base = format!("http://{}", server.local_addr());

    let http = reqwest::Client::new();
    let health: Value = http
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["ok"], true);

    let response = http.get(format!("{}/proxy/balances", base)).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let balances: Value = response.json().await.unwrap();
    assert_eq!(balances[0]["total"], "3");

    server.stop();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = occupied.local_addr().unwrap().port();

    let config = ProxyConfig {
        port,
        ..local_config("http://127.0.0.1:1")
    };
    let upstream = client(&config);
    let result = AxumServer::start(config, upstream).await;
    assert!(matches!(result, Err(AppError::Bind { .. })));
}
