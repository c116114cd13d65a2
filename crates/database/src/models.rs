//! Database models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user in the system, as mirrored from the external user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Directory UUID (e.g., "c27fb365-0c84-4cf2-8555-814bb065e448")
    pub id: String,
    /// Display name
    pub name: String,
    /// Comma-separated medication names, if any
    pub medications: Option<String>,
}

impl User {
    /// Split the stored medication column into a list.
    pub fn medication_list(&self) -> Vec<String> {
        self.medications
            .as_deref()
            .map(|meds| {
                meds.split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A wearable device that streams telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Device {
    /// Globally unique identifier, immutable once created.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Device type tag (e.g., "esp32").
    pub device_type: String,
    /// Owning user, if one was known at creation time.
    pub user_id: Option<String>,
    /// Creation timestamp (UTC).
    pub created_at: NaiveDateTime,
    /// Last time a reading was accepted from this device.
    pub last_seen: Option<NaiveDateTime>,
}

/// A stored six-axis telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Reading {
    /// Auto-incrementing row id.
    pub id: i64,
    /// Owning device identifier.
    pub device_id: String,
    /// Server-assigned capture timestamp (UTC).
    pub timestamp: NaiveDateTime,
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
    pub gyro_x: f64,
    pub gyro_y: f64,
    pub gyro_z: f64,
    /// Battery level, if the frame carried one.
    pub battery_level: Option<f64>,
}

/// A new reading awaiting insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub device_id: String,
    pub timestamp: NaiveDateTime,
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
    pub gyro_x: f64,
    pub gyro_y: f64,
    pub gyro_z: f64,
    pub battery_level: Option<f64>,
}

/// A derived per-sample shake intensity value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ShakeMetric {
    /// Generated UUID.
    pub id: String,
    /// Owning user identifier.
    pub user_id: String,
    /// Capture timestamp (UTC).
    pub timestamp: NaiveDateTime,
    /// Combined acceleration + angular-velocity magnitude.
    pub shake_per_minute: f64,
}

/// A logged medication intake time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MedicationLog {
    /// Generated UUID.
    pub id: String,
    /// Owning user identifier.
    pub user_id: String,
    /// Intake timestamp (UTC).
    pub timestamp: NaiveDateTime,
}
