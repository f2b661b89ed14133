//! Streamlet server binary: reads `STREAMLET_*` settings and serves until killed.

use streamlet::{server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("streamlet=info".parse()?))
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        addr = %config.addr,
        max_frame_len = config.max_frame_len,
        io_timeout_secs = config.io_timeout.as_secs(),
        unsupported_reply = config.unsupported_reply,
        "starting streamlet"
    );
    server::run_server(config).await?;
    Ok(())
}
