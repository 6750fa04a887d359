// API Key authentication middleware
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::error::ProxyError;
use crate::proxy::server::AppState;

// Reachable without a key so load balancers can probe liveness
const PUBLIC_PATHS: &[&str] = &["/", "/health", "/healthz", "/proxy", "/proxy/health"];

fn extract_api_key(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .or_else(|| {
            request
                .headers()
                .get("x-api-key")
                .and_then(|h| h.to_str().ok())
        })
}

/// Compare keys in time independent of where they differ.
/// Both sides are hashed first so lengths are equal too.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// API Key authentication middleware
///
/// Only enforced when `api_key` is configured.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ProxyError> {
    let Some(expected) = state.config.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return Ok(next.run(request).await);
    }

    match extract_api_key(&request) {
        Some(provided) if keys_match(provided.trim(), expected) => Ok(next.run(request).await),
        _ => {
            tracing::warn!(path = %request.uri().path(), "Rejected request without a valid API key");
            Err(ProxyError::Unauthorized)
        }
    }
}
