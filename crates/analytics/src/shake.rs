//! Shake intensity computation and metric submission.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use database::models::ShakeMetric;
use database::shake_metric;

use crate::error::{AnalyticsError, Result};

/// Compute the instantaneous shake intensity of a six-axis sample.
///
/// Returns the Euclidean norm of the acceleration triple plus the Euclidean
/// norm of the angular-velocity triple. This is a combined-magnitude proxy
/// for tremor, not a calibrated clinical measure; no smoothing or
/// sampling-rate normalization is applied, so the series is only comparable
/// over time when samples arrive at a roughly consistent rate.
pub fn shake_intensity(ax: f64, ay: f64, az: f64, gx: f64, gy: f64, gz: f64) -> f64 {
    let accel_magnitude = (ax * ax + ay * ay + az * az).sqrt();
    let gyro_magnitude = (gx * gx + gy * gy + gz * gz).sqrt();
    accel_magnitude + gyro_magnitude
}

/// A shake sample submission, validated field by field.
///
/// Every field is optional at the parsing boundary so that an absent field
/// surfaces as a named validation error rather than a generic decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ShakeSubmission {
    pub user_id: Option<String>,
    pub accel_x: Option<f64>,
    pub accel_y: Option<f64>,
    pub accel_z: Option<f64>,
    pub gyro_x: Option<f64>,
    pub gyro_y: Option<f64>,
    pub gyro_z: Option<f64>,
}

fn required(value: Option<f64>, name: &'static str) -> Result<f64> {
    value.ok_or(AnalyticsError::MissingField(name))
}

/// Compute and persist a shake metric for a submitted sample.
///
/// Nothing is persisted when validation fails.
pub async fn log_shake(pool: &SqlitePool, submission: &ShakeSubmission) -> Result<ShakeMetric> {
    let user_id = submission
        .user_id
        .as_deref()
        .ok_or(AnalyticsError::MissingField("user_id"))?;
    let ax = required(submission.accel_x, "accel_x")?;
    let ay = required(submission.accel_y, "accel_y")?;
    let az = required(submission.accel_z, "accel_z")?;
    let gx = required(submission.gyro_x, "gyro_x")?;
    let gy = required(submission.gyro_y, "gyro_y")?;
    let gz = required(submission.gyro_z, "gyro_z")?;

    let metric = ShakeMetric {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        timestamp: Utc::now().naive_utc(),
        shake_per_minute: shake_intensity(ax, ay, az, gx, gy, gz),
    };
    shake_metric::insert_shake_metric(pool, &metric).await?;

    tracing::debug!(user_id, intensity = metric.shake_per_minute, "Logged shake metric");
    Ok(metric)
}
