//! Trend prediction routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use analytics::TrendPrediction;
use database::{user, DatabaseError};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Response for a completed training run.
#[derive(Serialize)]
pub struct TrainResponse {
    pub message: String,
    pub samples: usize,
}

/// Fit the user's trend classifier on their recorded history.
pub async fn train(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<TrainResponse>> {
    ensure_user(&state, &user_id).await?;

    let samples =
        analytics::trend::train(state.db.pool(), &user_id, state.classifier.as_ref()).await?;
    Ok(Json(TrainResponse {
        message: "Trend model trained".to_string(),
        samples,
    }))
}

/// Query parameters for prediction.
#[derive(Deserialize)]
pub struct PredictQuery {
    /// Target date (`YYYY-MM-DD`); defaults to today.
    pub date: Option<String>,
}

/// Predict better/worse for a given recorded day.
pub async fn predict(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PredictQuery>,
) -> Result<Json<TrendPrediction>> {
    ensure_user(&state, &user_id).await?;

    let target_date = match query.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest("Invalid date format. Use YYYY-MM-DD.".to_string()))?,
        None => Utc::now().date_naive(),
    };

    let prediction = analytics::trend::predict(
        state.db.pool(),
        &user_id,
        target_date,
        state.classifier.as_ref(),
    )
    .await?;
    Ok(Json(prediction))
}

async fn ensure_user(state: &AppState, user_id: &str) -> Result<()> {
    if !user::user_exists(state.db.pool(), user_id).await? {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        }
        .into());
    }
    Ok(())
}
