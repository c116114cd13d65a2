//! Time-bucketed aggregation over stored shake metrics.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;
use sqlx::SqlitePool;

use database::{shake_metric, user};

use crate::error::Result;

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Average shake intensity per minute of a single day.
///
/// Selects all metrics for the user within `[day 00:00, day+1 00:00)` and
/// buckets them by `HH:MM` (seconds truncated). Minutes with no samples are
/// omitted rather than zero-filled.
pub async fn shake_by_minute(
    pool: &SqlitePool,
    user_id: &str,
    day: NaiveDate,
) -> Result<BTreeMap<String, f64>> {
    let start = day.and_time(NaiveTime::MIN);
    let end = start + Duration::days(1);
    let metrics = shake_metric::metrics_in_range(pool, user_id, start, end).await?;

    let mut buckets: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for metric in &metrics {
        buckets
            .entry(metric.timestamp.format("%H:%M").to_string())
            .or_default()
            .push(metric.shake_per_minute);
    }

    Ok(buckets
        .into_iter()
        .map(|(minute, values)| (minute, mean(&values)))
        .collect())
}

/// Medication list plus the naive daily-trend view of a user's tremor.
#[derive(Debug, Clone, Serialize)]
pub struct MedicationEffect {
    /// The user's current medication names.
    pub medications: Vec<String>,
    /// Average intensity per calendar date, all time.
    pub daily_shake_avg: BTreeMap<String, f64>,
}

/// Group all-time metrics by calendar date and average per date.
///
/// Independent of medication timing; see `medication::medication_response`
/// for the windowed comparison.
pub async fn medication_effect(pool: &SqlitePool, user_id: &str) -> Result<MedicationEffect> {
    let medications = user::get_medications(pool, user_id).await?;
    let daily = shake_metric::daily_averages(pool, user_id).await?;

    Ok(MedicationEffect {
        medications,
        daily_shake_avg: daily.into_iter().collect(),
    })
}
