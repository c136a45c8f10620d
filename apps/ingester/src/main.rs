mod config;
mod main_lib;

use config::Config;
use main_lib::{build_ingester, init_tracing, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let ingester = build_ingester(&config)?;

    ingester.start()?;
    tracing::info!("Polling {} every {:?}", config.feed_url, config.poll_interval);

    shutdown_signal().await;
    tracing::info!("Shutdown requested, stopping services");
    ingester.stop();
    ingester.await_termination().await;

    let unsaved = ingester.buffer.len();
    if unsaved > 0 {
        tracing::warn!("{} buffered records were not persisted", unsaved);
    }
    Ok(())
}
