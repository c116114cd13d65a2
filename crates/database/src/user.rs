//! User lookups.
//!
//! User lifecycle is owned by the external directory; this module only
//! persists and reads the columns the ingestion and analytics paths need.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::User;

/// Create a new user.
pub async fn create_user(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, medications)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.medications)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: user.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, medications
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Check whether a user exists.
pub async fn user_exists(pool: &SqlitePool, id: &str) -> Result<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Get a user's medication list.
pub async fn get_medications(pool: &SqlitePool, id: &str) -> Result<Vec<String>> {
    let user = get_user(pool, id).await?;
    Ok(user.medication_list())
}

/// Get the id of the first known user, if any.
///
/// Placeholder ownership policy for auto-provisioned devices, not a real
/// ownership decision.
pub async fn first_user_id(pool: &SqlitePool) -> Result<Option<String>> {
    let id = sqlx::query_scalar::<_, String>(
        r#"
        SELECT id FROM users ORDER BY rowid LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    if id.is_none() {
        tracing::warn!("No users found for device auto-provisioning");
    }

    Ok(id)
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
