use serde::{Deserialize, Serialize};

use crate::proxy::upstream::TimeSource;

/// Production Gate.io REST host
pub const DEFAULT_BASE_URL: &str = "https://api.gateio.ws";

/// 反代服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// 监听地址
    pub host: String,

    /// 监听端口
    pub port: u16,

    /// Inbound API key. `None` leaves the proxy open, as the original service was.
    pub api_key: Option<String>,

    /// Exchange host, without the `/api/v4` prefix
    pub base_url: String,

    /// Where signing timestamps come from
    pub time_source: TimeSource,

    /// Outbound request timeout (seconds)
    pub request_timeout: u64,

    /// Answer `GET /balances` with a zeroed record when the exchange is unreachable
    pub degraded_balances: bool,

    /// Directory for rolling log files; console only when unset
    pub log_dir: Option<String>,

    /// 上游代理配置
    pub upstream_proxy: UpstreamProxyConfig,
}

/// 上游代理配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    /// 是否启用
    pub enabled: bool,
    /// 代理地址 (http://, https://, socks5://)
    pub url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            time_source: TimeSource::Local,
            request_timeout: default_request_timeout(),
            degraded_balances: false,
            log_dir: None,
            upstream_proxy: UpstreamProxyConfig::default(),
        }
    }
}

fn default_request_timeout() -> u64 {
    5
}

impl ProxyConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Exchange host with any trailing slash removed
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
