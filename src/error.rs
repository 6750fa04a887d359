use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors raised while bringing the service up.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("Failed to bind address {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

// Implement alias for Result to simplify usage
pub type AppResult<T> = Result<T, AppError>;

/// Number of characters of a non-JSON upstream body echoed back to the caller.
pub const RAW_PREVIEW_CHARS: usize = 512;

/// Failures on the request path. Every variant renders into a response.
///
/// Local and transport failures (`InvalidRequest`, `RequestBuild`,
/// `Transport`, `Timeout`, `TimeSync`) carry `upstream: false` so callers can
/// tell "the proxy is broken" apart from "the exchange declined the request"
/// (`Rejected`, `MalformedBody`), which keep the exchange's status code.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to build upstream request: {0}")]
    RequestBuild(String),

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    #[error("Failed to fetch exchange time: {0}")]
    TimeSync(String),

    #[error("Upstream rejected the request with status {status}")]
    Rejected { status: StatusCode, body: Value },

    #[error("Upstream returned a non-JSON body with status {status}")]
    MalformedBody {
        status: StatusCode,
        content_type: Option<String>,
        raw: String,
    },

    #[error("Missing or invalid API key")]
    Unauthorized,
}

impl ProxyError {
    /// Short machine-readable label used in error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::InvalidRequest(_) => "invalid_request",
            ProxyError::RequestBuild(_) => "request_build",
            ProxyError::Transport(_) => "transport",
            ProxyError::Timeout(_) => "timeout",
            ProxyError::TimeSync(_) => "time_sync",
            ProxyError::Rejected { .. } => "rejected",
            ProxyError::MalformedBody { .. } => "malformed_body",
            ProxyError::Unauthorized => "unauthorized",
        }
    }

    /// True for failures that never got a usable answer from the exchange.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProxyError::Transport(_) | ProxyError::Timeout(_) | ProxyError::TimeSync(_)
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::RequestBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Transport(_) | ProxyError::TimeSync(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Rejected { status, .. } => *status,
            ProxyError::MalformedBody { status, .. } => {
                if status.is_success() {
                    StatusCode::BAD_GATEWAY
                } else {
                    *status
                }
            }
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProxyError::Timeout(err.to_string())
        } else if err.is_builder() {
            ProxyError::RequestBuild(err.to_string())
        } else {
            ProxyError::Transport(err.to_string())
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let body = match self {
            ProxyError::Rejected { body, .. } => body,
            ProxyError::MalformedBody {
                status,
                content_type,
                raw,
            } => json!({
                "upstream": true,
                "kind": kind,
                "error": "upstream returned a body that is not valid JSON",
                "status": status.as_u16(),
                "content_type": content_type,
                "raw_preview": raw.chars().take(RAW_PREVIEW_CHARS).collect::<String>(),
            }),
            other => json!({
                "upstream": false,
                "kind": kind,
                "error": other.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
