//! bifrost HTTP server (REST and GraphQL).
//!
//! # Environment Variables
//!
//! - `HTTP_ADDR`: bind address (default: 127.0.0.1:8000)
//! - `SQLITE_DBNAME`, `SQLITE_MAX_CONNECTIONS`: database
//! - `LOG_LEVEL`, `LOG_FORMAT`: logging
//!
//! See `HttpServerConfig` and `Settings` for the rest.

use anyhow::Result;
use app::module::{AppConfigModule, AppModule};
use command_utils::util::shutdown;
use dotenvy::dotenv;
use http_front::{boot_http_server, HttpServerConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let conf = command_utils::util::tracing::load_tracing_config_from_env().unwrap_or_default();
    command_utils::util::tracing::tracing_init(conf)?;

    tracing::info!("Starting bifrost HTTP Server");

    let config_module = Arc::new(AppConfigModule::new_by_env()?);
    let app_module = Arc::new(AppModule::new_by_env(config_module).await?);

    let server_config = HttpServerConfig::from_env();
    tracing::info!(
        "HTTP configuration: addr={}, max_limit={}, graphiql={}",
        server_config.addr,
        server_config.max_limit,
        server_config.graphiql
    );

    let (lock, mut wait) = shutdown::create_lock_and_wait();

    let server_result = match boot_http_server(app_module, server_config, lock, None).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("HTTP Server error: {:#?}", e);
            Err(e)
        }
    };

    if server_result.is_ok() {
        wait.wait().await;
    }
    tracing::info!("HTTP Server shutdown complete");

    server_result
}
