// Health and index handlers
use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::proxy::server::AppState;
use crate::proxy::upstream::SPOT_CURRENCY_PAIRS;

pub const SERVICE_NAME: &str = "gateio-proxy";

pub async fn handle_index() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "health": "/health",
        "routes": [
            "GET /balances",
            "GET /orders/open",
            "GET /orders/history",
            "POST /orders",
            "DELETE /orders/{id}?currency_pair=...",
            "GET /health",
            "GET /health/upstream"
        ],
        "proxy_prefix": "/proxy"
    }))
}

/// Local liveness only; never touches the exchange.
pub async fn handle_health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": SERVICE_NAME,
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Unauthenticated reachability probe against a public exchange endpoint.
/// Always answers 200; the body says whether the exchange is reachable.
pub async fn handle_upstream_health(State(state): State<AppState>) -> Json<Value> {
    match state.upstream.check_public(SPOT_CURRENCY_PAIRS).await {
        Ok(status) => Json(json!({
            "upstream": status.is_success(),
            "status": status.as_u16(),
            "checked_endpoint": SPOT_CURRENCY_PAIRS,
        })),
        Err(e) => {
            tracing::warn!("Upstream health check failed: {}", e);
            Json(json!({
                "upstream": false,
                "error": e.to_string(),
                "checked_endpoint": SPOT_CURRENCY_PAIRS,
            }))
        }
    }
}
