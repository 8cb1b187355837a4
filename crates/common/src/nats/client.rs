use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

/// Connect to a NATS server, bounding the initial TCP connect by `timeout`
pub async fn connect_nats(url: &str, timeout: Duration) -> Result<async_nats::Client> {
    info!(url = %url, timeout_ms = timeout.as_millis(), "Connecting to NATS");

    let client = async_nats::ConnectOptions::new()
        .connection_timeout(timeout)
        .connect(url)
        .await
        .context("Failed to connect to NATS")?;

    info!("Successfully connected to NATS");
    Ok(client)
}
