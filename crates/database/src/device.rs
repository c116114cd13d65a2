//! Device registry operations.

use chrono::{NaiveDateTime, Utc};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Device;
use crate::user;

/// Device type tag assigned to auto-provisioned devices.
pub const AUTO_DEVICE_TYPE: &str = "esp32";

/// Create a new device.
pub async fn create_device(pool: &SqlitePool, device: &Device) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO devices (id, name, device_type, user_id, created_at, last_seen)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&device.id)
    .bind(&device.name)
    .bind(&device.device_type)
    .bind(&device.user_id)
    .bind(device.created_at)
    .bind(device.last_seen)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Device",
                    id: device.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a device by ID.
pub async fn get_device(pool: &SqlitePool, id: &str) -> Result<Device> {
    sqlx::query_as::<_, Device>(
        r#"
        SELECT id, name, device_type, user_id, created_at, last_seen
        FROM devices
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Device",
        id: id.to_string(),
    })
}

/// Check whether a device exists.
pub async fn device_exists(pool: &SqlitePool, id: &str) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM devices WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Look up a device, creating it if it does not exist.
///
/// Safe to call concurrently for the same unseen identifier: the insert is
/// attempted first and a unique-constraint violation falls through to a
/// fetch, so exactly one row results and every caller observes it. The
/// created device is named after a short prefix of the identifier and owned
/// by the first known user (or nobody, if no user exists yet).
pub async fn resolve_or_create(pool: &SqlitePool, device_id: &str) -> Result<Device> {
    if let Some(device) = sqlx::query_as::<_, Device>(
        r#"
        SELECT id, name, device_type, user_id, created_at, last_seen
        FROM devices
        WHERE id = ?
        "#,
    )
    .bind(device_id)
    .fetch_optional(pool)
    .await?
    {
        return Ok(device);
    }

    let prefix = device_id.get(..8).unwrap_or(device_id);
    let device = Device {
        id: device_id.to_string(),
        name: format!("Auto-provisioned {prefix}"),
        device_type: AUTO_DEVICE_TYPE.to_string(),
        user_id: user::first_user_id(pool).await?,
        created_at: Utc::now().naive_utc(),
        last_seen: None,
    };

    tracing::info!(device_id = %device.id, "Creating new device");

    match create_device(pool, &device).await {
        Ok(()) => Ok(device),
        // Lost the creation race; the winner's row is the device.
        Err(DatabaseError::AlreadyExists { .. }) => get_device(pool, device_id).await,
        Err(e) => Err(e),
    }
}

/// Update a device's last-seen timestamp.
///
/// Last-write-wins under concurrent ingestion; a no-op if the device has
/// vanished in the meantime.
pub async fn touch_last_seen(pool: &SqlitePool, id: &str, at: NaiveDateTime) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE devices
        SET last_seen = ?
        WHERE id = ?
        "#,
    )
    .bind(at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
