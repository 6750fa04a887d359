use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::proxy::upstream::TimeSource;
use crate::proxy::ProxyConfig;

/// Optional JSON config file; environment variables override its values.
pub const CONFIG_PATH_ENV: &str = "GATEIO_PROXY_CONFIG";

/// Load service config: defaults, then the JSON file (if any), then env.
///
/// A `.env` file in the working directory is honored.
pub fn load_config() -> AppResult<ProxyConfig> {
    dotenvy::dotenv().ok();

    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => load_config_file(Path::new(path.trim()))?,
        _ => ProxyConfig::default(),
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    Ok(config)
}

pub fn load_config_file(path: &Path) -> AppResult<ProxyConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        AppError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid {}={}: {}", name, value, e)))
}

fn parse_flag(name: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::Config(format!("Invalid {}={}", name, other))),
    }
}

/// Apply environment overrides through `lookup`, so tests need not touch
/// the process environment.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("HOST") {
        config.host = v.trim().to_string();
    }
    if let Some(v) = lookup("PORT") {
        config.port = parse_env("PORT", &v)?;
    }
    if let Some(v) = lookup("GATEIO_BASE_URL") {
        config.base_url = v.trim().to_string();
    }
    if let Some(v) = lookup("GATEIO_TIME_SOURCE") {
        config.time_source = parse_env::<TimeSource>("GATEIO_TIME_SOURCE", &v)?;
    }
    if let Some(v) = lookup("GATEIO_REQUEST_TIMEOUT") {
        config.request_timeout = parse_env("GATEIO_REQUEST_TIMEOUT", &v)?;
    }
    if let Some(v) = lookup("GATEIO_DEGRADED_BALANCES") {
        config.degraded_balances = parse_flag("GATEIO_DEGRADED_BALANCES", &v)?;
    }
    if let Some(v) = lookup("PROXY_API_KEY") {
        let v = v.trim();
        config.api_key = (!v.is_empty()).then(|| v.to_string());
    }
    if let Some(v) = lookup("PROXY_LOG_DIR") {
        let v = v.trim();
        config.log_dir = (!v.is_empty()).then(|| v.to_string());
    }
    if let Some(v) = lookup("UPSTREAM_PROXY_URL") {
        let v = v.trim();
        config.upstream_proxy.enabled = !v.is_empty();
        config.upstream_proxy.url = v.to_string();
    }

    if config.request_timeout == 0 {
        return Err(AppError::Config(
            "request timeout must be at least one second".to_string(),
        ));
    }
    url::Url::parse(&config.base_url)
        .map_err(|e| AppError::Config(format!("Invalid base URL {}: {}", config.base_url, e)))?;

    Ok(())
}
