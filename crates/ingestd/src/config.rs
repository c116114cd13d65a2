//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Ingestion server configuration.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Server bind address. Binds all interfaces by default so wearables on
    /// the local network can connect.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
}

impl IngestConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `INGEST_ADDR` | Server bind address | `0.0.0.0:8765` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:tremorlog.db?mode=rwc` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("INGEST_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8765".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:tremorlog.db?mode=rwc".to_string());

        Ok(Self { addr, database_url })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid INGEST_ADDR format")]
    InvalidAddr,
}
