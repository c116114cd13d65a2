//! Shake metric routes.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use analytics::ShakeSubmission;
use database::models::ShakeMetric;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Submit a shake sample; computes and stores the intensity metric.
pub async fn log_shake(
    State(state): State<AppState>,
    Json(submission): Json<ShakeSubmission>,
) -> Result<(StatusCode, Json<ShakeMetric>)> {
    let metric = analytics::log_shake(state.db.pool(), &submission).await?;
    Ok((StatusCode::CREATED, Json(metric)))
}

/// Query parameters for the by-minute view.
#[derive(Deserialize)]
pub struct DayQuery {
    pub day: Option<String>,
}

/// Minute-bucketed average intensity for one day.
pub async fn shake_by_minute(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<DayQuery>,
) -> Result<Json<BTreeMap<String, f64>>> {
    let day_str = query
        .day
        .ok_or_else(|| ApiError::BadRequest("Missing \"day\" query parameter".to_string()))?;
    let day = NaiveDate::parse_from_str(&day_str, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest("Invalid date format. Use YYYY-MM-DD.".to_string()))?;

    let buckets = analytics::shake_by_minute(state.db.pool(), &user_id, day).await?;
    Ok(Json(buckets))
}
