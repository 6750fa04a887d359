// Upstream client implementation
// Signed one-shot calls against the Gate.io v4 REST API

use reqwest::{header, Client, Method, StatusCode};
use serde_json::Value;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::envelope::UpstreamEnvelope;
use super::signer::{RequestSigner, SignedRequest, TimeSource};
use super::{credentials::ApiCredentials, SPOT_TIME};
use crate::error::{AppError, ProxyError};
use crate::proxy::config::ProxyConfig;

const USER_AGENT: &str = concat!("gateio-proxy/", env!("CARGO_PKG_VERSION"));

// Gate.io auth headers (KEY / SIGN / Timestamp); header names are case-insensitive
pub const HEADER_KEY: &str = "key";
pub const HEADER_SIGN: &str = "sign";
pub const HEADER_TIMESTAMP: &str = "timestamp";

/// Scheme, host and port of a proxy URL; userinfo is never shown
fn proxy_display(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default();
            match parsed.port() {
                Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
                None => format!("{}://{}", parsed.scheme(), host),
            }
        }
        Err(_) => "<unparseable>".to_string(),
    }
}

pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
    signer: RequestSigner,
    time_source: TimeSource,
}

impl UpstreamClient {
    pub fn new(config: &ProxyConfig, credentials: ApiCredentials) -> Result<Self, AppError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(USER_AGENT);

        let proxy = &config.upstream_proxy;
        if proxy.enabled && !proxy.url.is_empty() {
            match reqwest::Proxy::all(&proxy.url) {
                Ok(p) => {
                    builder = builder.proxy(p);
                    info!("UpstreamClient enabled proxy: {}", proxy_display(&proxy.url));
                }
                Err(e) => {
                    return Err(AppError::Config(format!(
                        "Invalid upstream proxy address {}: {}",
                        proxy_display(&proxy.url),
                        e
                    )));
                }
            }
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url: config.normalized_base_url().to_string(),
            signer: RequestSigner::new(credentials),
            time_source: config.time_source,
        })
    }

    pub fn time_source(&self) -> TimeSource {
        self.time_source
    }

    /// Build exchange URL
    fn build_url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query)
        }
    }

    /// Resolve the timestamp for one signature from the configured source.
    pub async fn timestamp(&self) -> Result<i64, ProxyError> {
        match self.time_source {
            TimeSource::Local => Ok(chrono::Utc::now().timestamp()),
            TimeSource::Exchange => self.fetch_exchange_time().await,
        }
    }

    /// `GET /spot/time`; `server_time` is in milliseconds.
    async fn fetch_exchange_time(&self) -> Result<i64, ProxyError> {
        let url = self.build_url(SPOT_TIME, "");
        let response = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ProxyError::TimeSync(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::TimeSync(format!("status {}", status)));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ProxyError::TimeSync(format!("Parse json failed: {}", e)))?;

        parse_server_time(&json)
            .ok_or_else(|| ProxyError::TimeSync("response has no server_time".to_string()))
    }

    /// Sign a call with a freshly resolved timestamp.
    pub async fn sign(
        &self,
        method: &Method,
        path: &str,
        query: &str,
        body: Option<&Value>,
    ) -> Result<SignedRequest, ProxyError> {
        let timestamp = self.timestamp().await?;
        Ok(self.signer.sign(method.as_str(), path, query, body, timestamp))
    }

    /// Send one authenticated call and read the response through.
    ///
    /// Non-success statuses are not errors at this level; the envelope keeps
    /// the status so the caller can decide.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<&Value>,
    ) -> Result<UpstreamEnvelope, ProxyError> {
        let signed = self.sign(&method, path, query, body).await?;
        let url = self.build_url(path, query);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            HEADER_KEY,
            header::HeaderValue::from_str(self.signer.api_key())
                .map_err(|_| ProxyError::RequestBuild("API key is not a valid header value".into()))?,
        );
        headers.insert(
            HEADER_SIGN,
            header::HeaderValue::from_str(&signed.signature)
                .map_err(|e| ProxyError::RequestBuild(e.to_string()))?,
        );
        headers.insert(HEADER_TIMESTAMP, header::HeaderValue::from(signed.timestamp));

        debug!(
            method = %signed.method,
            endpoint = %path,
            timestamp = signed.timestamp,
            "Signed upstream request"
        );

        let mut request = self.http_client.request(method.clone(), &url).headers(headers);
        if !signed.body.is_empty() {
            request = request.body(signed.body);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|e| {
            warn!(method = %method, endpoint = %path, "Upstream request failed: {}", e);
            ProxyError::from(e)
        })?;

        let status = response.status();
        let response_headers = response.headers().clone();
        // Read as text first: HTML error pages must survive to the caller.
        let text = response.text().await?;

        info!(
            method = %method,
            endpoint = %path,
            status = status.as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "Upstream responded"
        );

        Ok(UpstreamEnvelope::from_text(status, response_headers, text))
    }

    /// Unauthenticated GET used to probe reachability.
    pub async fn check_public(&self, path: &str) -> Result<StatusCode, ProxyError> {
        let url = self.build_url(path, "");
        let response = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        Ok(response.status())
    }
}

fn parse_server_time(json: &Value) -> Option<i64> {
    let raw = json.get("server_time")?;
    let millis = match raw {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Some(millis / 1000)
}
