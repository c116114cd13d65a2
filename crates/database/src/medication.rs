//! Medication intake log persistence.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::MedicationLog;

/// Persist a medication intake time.
pub async fn insert_medication_log(pool: &SqlitePool, log: &MedicationLog) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO medication_logs (id, user_id, timestamp)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&log.id)
    .bind(&log.user_id)
    .bind(log.timestamp)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_foreign_key_violation() {
                return DatabaseError::ForeignKey {
                    entity: "MedicationLog",
                    id: log.user_id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get all intake times for a user, oldest first.
pub async fn list_medication_logs(pool: &SqlitePool, user_id: &str) -> Result<Vec<MedicationLog>> {
    let rows = sqlx::query_as::<_, MedicationLog>(
        r#"
        SELECT id, user_id, timestamp
        FROM medication_logs
        WHERE user_id = ?
        ORDER BY timestamp
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
