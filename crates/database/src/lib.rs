//! SQLite persistence layer for Tremorlog.
//!
//! This crate provides async database operations for devices, telemetry
//! readings, shake metrics, and medication logs using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, device};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:tremorlog.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Resolve a device, provisioning it on first sight
//!     let device = device::resolve_or_create(
//!         db.pool(),
//!         "c27fb365-0c84-4cf2-8555-814bb065e448",
//!     )
//!     .await?;
//!     println!("{}", device.name);
//!
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;
pub mod medication;
pub mod models;
pub mod reading;
pub mod shake_metric;
pub mod user;

pub use error::{DatabaseError, Result};
pub use models::{Device, MedicationLog, NewReading, Reading, ShakeMetric, User};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Set high enough to serve the ingestion listener and the HTTP surface
    /// concurrently.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    // A single connection keeps the in-memory database shared across tasks.
    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn sample_reading(device_id: &str) -> NewReading {
        NewReading {
            device_id: device_id.to_string(),
            timestamp: Utc::now().naive_utc(),
            accel_x: 0.1,
            accel_y: 0.2,
            accel_z: 0.3,
            gyro_x: 1.0,
            gyro_y: 2.0,
            gyro_z: 3.0,
            battery_level: Some(87.5),
        }
    }

    #[tokio::test]
    async fn test_resolve_or_create_is_idempotent() {
        let db = test_db().await;
        let id = "11111111-2222-3333-4444-555555555555";

        let first = device::resolve_or_create(db.pool(), id).await.unwrap();
        let second = device::resolve_or_create(db.pool(), id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "Auto-provisioned 11111111");
        assert_eq!(first.device_type, device::AUTO_DEVICE_TYPE);
        // No user exists yet, so ownership stays unset.
        assert_eq!(first.user_id, None);
    }

    #[tokio::test]
    async fn test_resolve_or_create_concurrent_single_row() {
        let db = test_db().await;
        let id = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee";

        let (a, b) = tokio::join!(
            device::resolve_or_create(db.pool(), id),
            device::resolve_or_create(db.pool(), id),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.id, b.id);

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM devices")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_auto_provision_assigns_first_user() {
        let db = test_db().await;
        let user = User {
            id: "user-1".to_string(),
            name: "Maria".to_string(),
            medications: Some("levodopa,ropinirole".to_string()),
        };
        user::create_user(db.pool(), &user).await.unwrap();

        let device = device::resolve_or_create(db.pool(), "99999999-0000-0000-0000-000000000000")
            .await
            .unwrap();
        assert_eq!(device.user_id.as_deref(), Some("user-1"));

        let meds = user::get_medications(db.pool(), "user-1").await.unwrap();
        assert_eq!(meds, vec!["levodopa", "ropinirole"]);
    }

    #[tokio::test]
    async fn test_touch_last_seen_missing_device_is_noop() {
        let db = test_db().await;
        let result =
            device::touch_last_seen(db.pool(), "no-such-device", Utc::now().naive_utc()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_insert_reading_requires_device() {
        let db = test_db().await;
        let result = reading::insert_reading(db.pool(), &sample_reading("ghost")).await;
        assert!(matches!(result, Err(DatabaseError::ForeignKey { .. })));
    }

    #[tokio::test]
    async fn test_readings_paginate_newest_first() {
        let db = test_db().await;
        let device = device::resolve_or_create(db.pool(), "12121212-0000-0000-0000-000000000000")
            .await
            .unwrap();

        let base = Utc::now().naive_utc();
        for i in 0..3 {
            let mut r = sample_reading(&device.id);
            r.timestamp = base + chrono::Duration::seconds(i);
            r.accel_x = i as f64;
            reading::insert_reading(db.pool(), &r).await.unwrap();
        }

        let page = reading::list_readings(db.pool(), &device.id, 2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].accel_x, 2.0);
        assert_eq!(page[1].accel_x, 1.0);

        let rest = reading::list_readings(db.pool(), &device.id, 2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].accel_x, 0.0);

        let asc = reading::readings_in_range(
            db.pool(),
            &device.id,
            base,
            base + chrono::Duration::seconds(10),
        )
        .await
        .unwrap();
        assert_eq!(asc.len(), 3);
        assert_eq!(asc[0].accel_x, 0.0);
    }

    #[tokio::test]
    async fn test_daily_averages_group_by_date() {
        let db = test_db().await;
        let user = User {
            id: "user-2".to_string(),
            name: "Ion".to_string(),
            medications: None,
        };
        user::create_user(db.pool(), &user).await.unwrap();

        let day1 = chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let day2 = chrono::NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        for (day, value) in [(day1, 4.0), (day1, 6.0), (day2, 10.0)] {
            let metric = ShakeMetric {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                timestamp: day.and_hms_opt(10, 0, 0).unwrap(),
                shake_per_minute: value,
            };
            shake_metric::insert_shake_metric(db.pool(), &metric).await.unwrap();
        }

        let daily = shake_metric::daily_averages(db.pool(), &user.id).await.unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0], ("2025-03-01".to_string(), 5.0));
        assert_eq!(daily[1], ("2025-03-02".to_string(), 10.0));
    }
}
