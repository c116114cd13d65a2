//! Medication intake logging and before/after response comparison.

use chrono::{Duration, NaiveDateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use database::models::MedicationLog;
use database::{medication, shake_metric, user, DatabaseError};

use crate::aggregate::mean;
use crate::error::Result;

/// Minutes before an intake considered the "before" window.
pub const BEFORE_WINDOW_MINUTES: i64 = 30;

/// Minutes after an intake considered the "after" window.
pub const AFTER_WINDOW_MINUTES: i64 = 90;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Record the time a user actually took medication.
///
/// Uses the caller-supplied timestamp when given, otherwise server time.
pub async fn log_medication(
    pool: &SqlitePool,
    user_id: &str,
    at: Option<NaiveDateTime>,
) -> Result<MedicationLog> {
    if !user::user_exists(pool, user_id).await? {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        }
        .into());
    }

    let log = MedicationLog {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        timestamp: at.unwrap_or_else(|| Utc::now().naive_utc()),
    };
    medication::insert_medication_log(pool, &log).await?;

    Ok(log)
}

/// Tremor comparison around one medication intake.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationResponse {
    /// Intake time.
    pub med_time: NaiveDateTime,
    /// Average intensity in `[med_time - 30min, med_time)`.
    pub before_avg: f64,
    /// Average intensity in `[med_time, med_time + 90min)`.
    pub after_avg: f64,
    /// `before_avg - after_avg`.
    pub delta: f64,
    /// Whether tremor dropped after the intake.
    pub effective: bool,
}

/// Compare tremor levels before and after each logged intake.
///
/// An entry is produced only when both windows contain at least one metric.
/// Averages and delta are rounded to two decimal places for presentation.
pub async fn medication_response(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<MedicationResponse>> {
    if !user::user_exists(pool, user_id).await? {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        }
        .into());
    }

    let logs = medication::list_medication_logs(pool, user_id).await?;
    let metrics = shake_metric::all_metrics(pool, user_id).await?;

    let mut response = Vec::new();
    for log in &logs {
        let window_start = log.timestamp - Duration::minutes(BEFORE_WINDOW_MINUTES);
        let window_end = log.timestamp + Duration::minutes(AFTER_WINDOW_MINUTES);

        let before: Vec<f64> = metrics
            .iter()
            .filter(|m| m.timestamp >= window_start && m.timestamp < log.timestamp)
            .map(|m| m.shake_per_minute)
            .collect();
        let after: Vec<f64> = metrics
            .iter()
            .filter(|m| m.timestamp >= log.timestamp && m.timestamp < window_end)
            .map(|m| m.shake_per_minute)
            .collect();

        if before.is_empty() || after.is_empty() {
            continue;
        }

        let before_avg = mean(&before);
        let after_avg = mean(&after);
        response.push(MedicationResponse {
            med_time: log.timestamp,
            before_avg: round2(before_avg),
            after_avg: round2(after_avg),
            delta: round2(before_avg - after_avg),
            effective: before_avg > after_avg,
        });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use database::models::{ShakeMetric, User};
    use database::Database;

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn seed_user(db: &Database, id: &str) {
        let user = User {
            id: id.to_string(),
            name: "Test".to_string(),
            medications: None,
        };
        user::create_user(db.pool(), &user).await.unwrap();
    }

    async fn seed_metric(db: &Database, user_id: &str, timestamp: NaiveDateTime, value: f64) {
        let metric = ShakeMetric {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            timestamp,
            shake_per_minute: value,
        };
        shake_metric::insert_shake_metric(db.pool(), &metric).await.unwrap();
    }

    #[tokio::test]
    async fn test_effective_intake() {
        let db = test_db().await;
        seed_user(&db, "user-1").await;

        let intake = NaiveDate::from_ymd_opt(2025, 4, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        log_medication(db.pool(), "user-1", Some(intake)).await.unwrap();

        seed_metric(&db, "user-1", intake - Duration::minutes(10), 10.0).await;
        seed_metric(&db, "user-1", intake + Duration::minutes(10), 4.0).await;

        let response = medication_response(db.pool(), "user-1").await.unwrap();
        assert_eq!(response.len(), 1);
        let entry = &response[0];
        assert_eq!(entry.med_time, intake);
        assert_eq!(entry.before_avg, 10.0);
        assert_eq!(entry.after_avg, 4.0);
        assert_eq!(entry.delta, 6.0);
        assert!(entry.effective);
    }

    #[tokio::test]
    async fn test_entry_omitted_when_a_window_is_empty() {
        let db = test_db().await;
        seed_user(&db, "user-1").await;

        let intake = NaiveDate::from_ymd_opt(2025, 4, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        log_medication(db.pool(), "user-1", Some(intake)).await.unwrap();

        // Only an "after" sample; no "before" data.
        seed_metric(&db, "user-1", intake + Duration::minutes(5), 4.0).await;

        let response = medication_response(db.pool(), "user-1").await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_window_boundaries_are_half_open() {
        let db = test_db().await;
        seed_user(&db, "user-1").await;

        let intake = NaiveDate::from_ymd_opt(2025, 4, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        log_medication(db.pool(), "user-1", Some(intake)).await.unwrap();

        // Exactly at the intake time counts as "after", not "before".
        seed_metric(&db, "user-1", intake, 4.0).await;
        // 30 minutes before is inside the before-window's closed lower bound.
        seed_metric(&db, "user-1", intake - Duration::minutes(BEFORE_WINDOW_MINUTES), 8.0).await;
        // 90 minutes after is outside the after-window.
        seed_metric(&db, "user-1", intake + Duration::minutes(AFTER_WINDOW_MINUTES), 99.0).await;

        let response = medication_response(db.pool(), "user-1").await.unwrap();
        assert_eq!(response.len(), 1);
        assert_eq!(response[0].before_avg, 8.0);
        assert_eq!(response[0].after_avg, 4.0);
        assert_eq!(response[0].delta, 4.0);
    }

    #[tokio::test]
    async fn test_log_medication_unknown_user() {
        let db = test_db().await;
        let result = log_medication(db.pool(), "ghost", None).await;
        assert!(matches!(
            result,
            Err(crate::AnalyticsError::Database(DatabaseError::NotFound { .. }))
        ));
    }
}
