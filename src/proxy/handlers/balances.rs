// Balances Handler
use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};
use reqwest::Method;
use tracing::warn;

use super::log_failure;
use crate::error::ProxyError;
use crate::proxy::mappers::{shape_balances, BalanceRecord};
use crate::proxy::server::AppState;
use crate::proxy::upstream::SPOT_ACCOUNTS;

/// `GET /balances` → shaped balance records
pub async fn handle_balances(State(state): State<AppState>) -> Result<Response, ProxyError> {
    let result = state
        .upstream
        .forward(Method::GET, SPOT_ACCOUNTS, "", None)
        .await
        .and_then(|envelope| envelope.into_json());

    match result {
        Ok(json) => match shape_balances(json) {
            Ok(records) => Ok(Json(records).into_response()),
            Err(unshaped) => Ok(Json(unshaped).into_response()),
        },
        // Only unreachable-exchange failures degrade; rejections always surface
        Err(e) if e.is_transport() && state.config.degraded_balances => {
            warn!(kind = e.kind(), "Serving degraded balances: {}", e);
            Ok(Json(vec![BalanceRecord::degraded()]).into_response())
        }
        Err(e) => {
            log_failure("balances", &e);
            Err(e)
        }
    }
}
