//! Shake metric persistence.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::ShakeMetric;

/// Persist a shake metric.
pub async fn insert_shake_metric(pool: &SqlitePool, metric: &ShakeMetric) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO shake_metrics (id, user_id, timestamp, shake_per_minute)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&metric.id)
    .bind(&metric.user_id)
    .bind(metric.timestamp)
    .bind(metric.shake_per_minute)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_foreign_key_violation() {
                return DatabaseError::ForeignKey {
                    entity: "ShakeMetric",
                    id: metric.user_id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a user's metrics within `[start, end)`, oldest first.
pub async fn metrics_in_range(
    pool: &SqlitePool,
    user_id: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<ShakeMetric>> {
    let rows = sqlx::query_as::<_, ShakeMetric>(
        r#"
        SELECT id, user_id, timestamp, shake_per_minute
        FROM shake_metrics
        WHERE user_id = ? AND timestamp >= ? AND timestamp < ?
        ORDER BY timestamp
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Get all of a user's metrics, oldest first.
pub async fn all_metrics(pool: &SqlitePool, user_id: &str) -> Result<Vec<ShakeMetric>> {
    let rows = sqlx::query_as::<_, ShakeMetric>(
        r#"
        SELECT id, user_id, timestamp, shake_per_minute
        FROM shake_metrics
        WHERE user_id = ?
        ORDER BY timestamp
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Average intensity per calendar date for a user, ascending by date.
pub async fn daily_averages(pool: &SqlitePool, user_id: &str) -> Result<Vec<(String, f64)>> {
    let rows = sqlx::query_as::<_, (String, f64)>(
        r#"
        SELECT date(timestamp) AS day, AVG(shake_per_minute) AS avg_shake
        FROM shake_metrics
        WHERE user_id = ?
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
