// Handlers module - API endpoint handlers

pub mod balances;
pub mod health;
pub mod orders;

use axum::response::{IntoResponse, Json, Response};
use tracing::warn;

use crate::error::ProxyError;
use crate::proxy::upstream::UpstreamEnvelope;

/// Forward an exchange answer unchanged, status included.
pub(crate) fn passthrough(envelope: UpstreamEnvelope) -> Result<Response, ProxyError> {
    let status = envelope.status;
    let json = envelope.into_json()?;
    Ok((status, Json(json)).into_response())
}

pub(crate) fn log_failure(route: &str, err: &ProxyError) {
    warn!(route, kind = err.kind(), status = err.status().as_u16(), "{}", err);
}
