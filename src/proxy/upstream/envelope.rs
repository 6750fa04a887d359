// Upstream response envelope
// Status, headers and body as read from the exchange

use reqwest::{header::HeaderMap, StatusCode};
use serde_json::Value;

use crate::error::ProxyError;

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Json(Value),
    /// Body text that did not parse as JSON, kept verbatim
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct UpstreamEnvelope {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: UpstreamBody,
}

impl UpstreamEnvelope {
    pub fn from_text(status: StatusCode, headers: HeaderMap, text: String) -> Self {
        let body = match serde_json::from_str::<Value>(&text) {
            Ok(json) => UpstreamBody::Json(json),
            Err(_) => UpstreamBody::Raw(text),
        };
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn content_type(&self) -> Option<String> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Success JSON passes; everything else becomes the matching error.
    pub fn into_json(self) -> Result<Value, ProxyError> {
        let content_type = self.content_type();
        match self.body {
            UpstreamBody::Json(json) if self.status.is_success() => Ok(json),
            UpstreamBody::Json(json) => Err(ProxyError::Rejected {
                status: self.status,
                body: json,
            }),
            UpstreamBody::Raw(raw) => Err(ProxyError::MalformedBody {
                status: self.status,
                content_type,
                raw,
            }),
        }
    }
}
