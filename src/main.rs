use gateio_proxy::modules::{init_logger, load_config};
use gateio_proxy::proxy::upstream::{ApiCredentials, UpstreamClient};
use gateio_proxy::AxumServer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    let _log_guard = init_logger(config.log_dir.as_deref());

    let credentials = match ApiCredentials::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };
    info!(
        base_url = %config.base_url,
        time_source = ?config.time_source,
        timeout_secs = config.request_timeout,
        "Configuration loaded"
    );

    let upstream = UpstreamClient::new(&config, credentials)?;
    let (server, handle) = AxumServer::start(config, upstream).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    server.stop();
    handle.await?;
    Ok(())
}
