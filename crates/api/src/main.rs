//! Analytics HTTP surface for Tremorlog.
//!
//! Serves shake submission, aggregation views, medication tracking, trend
//! prediction, and stored-reading queries as a JSON API.

mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use analytics::HeuristicClassifier;
use database::Database;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting analytics API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // The in-process stand-in classifier; swap for a real model service here.
    let classifier = Arc::new(HeuristicClassifier::default());

    // Build application state
    let state = AppState::new(db, classifier);

    // Build router
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "Analytics API listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
