mod config;
mod db;
mod http;
mod models;
mod processor;
mod sink;

use config::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Alert Ingest Service (Webhook Edition)...");

    // Init DB
    let pool = db::init_pool(&config.database_url).await?;
    info!("Connected to database");

    // Start webhook server
    http::start_http_server(&config, pool).await?;

    Ok(())
}
