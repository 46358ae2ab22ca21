pub mod error;
pub mod models;
pub mod modules;
pub mod proxy; // Proxy service module
mod utils;

use error::AppResult;
use modules::logger;
use tracing::info;

/// Load configuration, serve until Ctrl+C, then shut down
pub async fn run() -> AppResult<()> {
    // Initialize logger
    logger::init_logger();

    let config = modules::config::load_app_config()?;

    let (server, handle) = proxy::AxumServer::start(&config).await?;
    info!("Proxy service started on {}", server.local_addr());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    server.stop();
    // Wait for server task to complete
    handle.await.ok();

    Ok(())
}
