// Orders Handler
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Json, Path, Query, State},
    response::Response,
};
use reqwest::Method;

use super::{log_failure, passthrough};
use crate::error::ProxyError;
use crate::proxy::mappers::orders::{cancel_order_target, list_orders_query};
use crate::proxy::mappers::{CancelOrderQuery, CreateOrderRequest, ListOrdersQuery, OrderStatus};
use crate::proxy::server::AppState;
use crate::proxy::upstream::SPOT_ORDERS;

async fn list_orders(
    state: AppState,
    status: OrderStatus,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Response, ProxyError> {
    let Query(query) = query.map_err(|e| ProxyError::InvalidRequest(e.body_text()))?;
    let query_string = list_orders_query(status, &query);

    let result = state
        .upstream
        .forward(Method::GET, SPOT_ORDERS, &query_string, None)
        .await
        .and_then(passthrough);
    if let Err(e) = &result {
        log_failure("orders", e);
    }
    result
}

/// `GET /orders/open`
pub async fn handle_open_orders(
    State(state): State<AppState>,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Response, ProxyError> {
    list_orders(state, OrderStatus::Open, query).await
}

/// `GET /orders/history`
pub async fn handle_order_history(
    State(state): State<AppState>,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Response, ProxyError> {
    list_orders(state, OrderStatus::Finished, query).await
}

/// `POST /orders`
///
/// Validation happens before signing; a bad payload never reaches the exchange.
/// Write endpoints never degrade.
pub async fn handle_create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Response, ProxyError> {
    let Json(request) = payload.map_err(|e| ProxyError::InvalidRequest(e.body_text()))?;
    let body = request.into_upstream_body()?;

    tracing::info!(
        currency_pair = body["currency_pair"].as_str().unwrap_or_default(),
        side = body["side"].as_str().unwrap_or_default(),
        order_type = body["type"].as_str().unwrap_or_default(),
        "Placing order"
    );

    let result = state
        .upstream
        .forward(Method::POST, SPOT_ORDERS, "", Some(&body))
        .await
        .and_then(passthrough);
    if let Err(e) = &result {
        log_failure("create_order", e);
    }
    result
}

/// `DELETE /orders/:id?currency_pair=...`
pub async fn handle_cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    query: Result<Query<CancelOrderQuery>, QueryRejection>,
) -> Result<Response, ProxyError> {
    let Query(query) = query.map_err(|e| ProxyError::InvalidRequest(e.body_text()))?;
    let (path, query_string) = cancel_order_target(&order_id, &query)?;

    let result = state
        .upstream
        .forward(Method::DELETE, &path, &query_string, None)
        .await
        .and_then(passthrough);
    if let Err(e) = &result {
        log_failure("cancel_order", e);
    }
    result
}
