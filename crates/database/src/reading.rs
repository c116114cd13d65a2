//! Append-only reading persistence.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewReading, Reading};

/// Persist a reading, returning its row id.
///
/// Fails with [`DatabaseError::ForeignKey`] if the referenced device no
/// longer exists.
pub async fn insert_reading(pool: &SqlitePool, reading: &NewReading) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO readings
            (device_id, timestamp, accel_x, accel_y, accel_z, gyro_x, gyro_y, gyro_z, battery_level)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&reading.device_id)
    .bind(reading.timestamp)
    .bind(reading.accel_x)
    .bind(reading.accel_y)
    .bind(reading.accel_z)
    .bind(reading.gyro_x)
    .bind(reading.gyro_y)
    .bind(reading.gyro_z)
    .bind(reading.battery_level)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_foreign_key_violation() {
                return DatabaseError::ForeignKey {
                    entity: "Reading",
                    id: reading.device_id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(result.last_insert_rowid())
}

/// Get recent readings for a device, newest first.
pub async fn list_readings(
    pool: &SqlitePool,
    device_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Reading>> {
    let rows = sqlx::query_as::<_, Reading>(
        r#"
        SELECT id, device_id, timestamp,
               accel_x, accel_y, accel_z, gyro_x, gyro_y, gyro_z, battery_level
        FROM readings
        WHERE device_id = ?
        ORDER BY timestamp DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(device_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Get readings for a device within `[start, end)`, oldest first.
pub async fn readings_in_range(
    pool: &SqlitePool,
    device_id: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<Reading>> {
    let rows = sqlx::query_as::<_, Reading>(
        r#"
        SELECT id, device_id, timestamp,
               accel_x, accel_y, accel_z, gyro_x, gyro_y, gyro_z, battery_level
        FROM readings
        WHERE device_id = ? AND timestamp >= ? AND timestamp < ?
        ORDER BY timestamp
        "#,
    )
    .bind(device_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count readings stored for a device.
pub async fn count_readings(pool: &SqlitePool, device_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM readings WHERE device_id = ?
        "#,
    )
    .bind(device_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
