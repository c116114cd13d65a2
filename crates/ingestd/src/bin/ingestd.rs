//! Telemetry ingestion daemon.

use database::Database;
use ingestd::IngestConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = IngestConfig::from_env()?;
    info!(addr = %config.addr, "Starting ingestion server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Serve until stopped
    ingestd::server::run(db, config.addr).await?;

    Ok(())
}
