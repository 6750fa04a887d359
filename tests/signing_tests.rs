//! Signed outbound calls as seen by the exchange.

mod common;

use axum::http::StatusCode;
use common::*;
use gateio_proxy::proxy::upstream::{
    ApiCredentials, RequestSigner, TimeSource, UpstreamBody, UpstreamClient,
};
use reqwest::Method;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn header_str<'a>(request: &'a Request, name: &str) -> &'a str {
    request
        .headers
        .get(name)
        .unwrap_or_else(|| panic!("missing header {}", name))
        .to_str()
        .unwrap()
}

/// Recompute the signature the exchange would expect for a received request
fn expected_signature(request: &Request) -> String {
    let timestamp: i64 = header_str(request, "timestamp").parse().unwrap();
    let body: Option<Value> = if request.body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&request.body).unwrap())
    };
    let signer = RequestSigner::new(ApiCredentials::new(TEST_API_KEY, TEST_API_SECRET));
    signer
        .sign(
            request.method.as_str(),
            request.url.path(),
            request.url.query().unwrap_or(""),
            body.as_ref(),
            timestamp,
        )
        .signature
}

#[tokio::test]
async fn test_get_signature_verifies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/spot/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (status, _) = send(
        build_test_app(&server.uri()),
        get("/orders/open?currency_pair=ETH_USDT&limit=10"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(
        request.url.query(),
        Some("currency_pair=ETH_USDT&status=open&limit=10")
    );
    assert!(request.body.is_empty());
    assert_eq!(header_str(request, "key"), TEST_API_KEY);
    assert_eq!(header_str(request, "sign"), expected_signature(request));

    let ts: i64 = header_str(request, "timestamp").parse().unwrap();
    assert!((chrono::Utc::now().timestamp() - ts).abs() <= 5);
}

#[tokio::test]
async fn test_post_signature_covers_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/spot/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "1"})))
        .mount(&server)
        .await;

    let (status, _) = send(
        build_test_app(&server.uri()),
        post_json(
            "/orders",
            r#"{"currency_pair":"BTC_USDT","type":"limit","side":"sell","amount":"0.5","price":"65000"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    // Body on the wire is the compact serialization that was signed
    assert_eq!(
        std::str::from_utf8(&request.body).unwrap(),
        r#"{"amount":"0.5","currency_pair":"BTC_USDT","price":"65000","side":"sell","type":"limit"}"#
    );
    assert_eq!(header_str(request, "sign"), expected_signature(request));
}

#[tokio::test]
async fn test_exchange_time_source_used_for_timestamp() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/spot/time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"server_time": 1700000000123_i64})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/spot/accounts"))
        .and(header("timestamp", "1700000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let app = build_test_app_with_time_source(&server.uri(), TimeSource::Exchange);
    let (status, _) = send(app, get("/balances")).await;
    assert_eq!(status, StatusCode::OK);

    let requests = server.received_requests().await.unwrap();
    let accounts = requests
        .iter()
        .find(|r| r.url.path() == "/api/v4/spot/accounts")
        .unwrap();
    assert_eq!(header_str(accounts, "sign"), expected_signature(accounts));
}

#[tokio::test]
async fn test_exchange_time_failure_stops_the_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/spot/time"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v4/spot/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "1"})))
        .expect(0)
        .mount(&server)
        .await;

    let app = build_test_app_with_time_source(&server.uri(), TimeSource::Exchange);
    let (status, body) = send(
        app,
        post_json(
            "/orders",
            r#"{"currency_pair":"BTC_USDT","side":"buy","amount":"1"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "time_sync");
    assert_eq!(body["upstream"], false);

    server.verify().await;
}

#[tokio::test]
async fn test_forward_returns_raw_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v4/spot/orders/7"))
        .respond_with(ResponseTemplate::new(502).set_body_raw("Bad Gateway", "text/plain"))
        .mount(&server)
        .await;

    let client = UpstreamClient::new(
        &test_config(&server.uri()),
        ApiCredentials::new(TEST_API_KEY, TEST_API_SECRET),
    )
    .unwrap();
    let envelope = client
        .forward(Method::DELETE, "/api/v4/spot/orders/7", "currency_pair=BTC_USDT", None)
        .await
        .unwrap();

    assert_eq!(envelope.status, StatusCode::BAD_GATEWAY);
    assert_eq!(envelope.content_type().as_deref(), Some("text/plain"));
    assert_eq!(envelope.body, UpstreamBody::Raw("Bad Gateway".to_string()));
}
