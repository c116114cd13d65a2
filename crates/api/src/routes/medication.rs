//! Medication tracking routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use analytics::{MedicationEffect, MedicationResponse};
use database::models::MedicationLog;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Medication list plus the naive daily-average tremor view.
pub async fn medication_effect(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MedicationEffect>> {
    let effect = analytics::medication_effect(state.db.pool(), &user_id).await?;
    Ok(Json(effect))
}

/// Request body for logging an intake time.
#[derive(Deserialize, Default)]
pub struct LogMedicationRequest {
    /// ISO 8601 intake time; defaults to server time when absent.
    pub timestamp: Option<String>,
}

/// Response for a logged intake.
#[derive(Serialize)]
pub struct LogMedicationResponse {
    pub message: String,
    pub log: MedicationLog,
}

/// Log the time the user actually took medication.
pub async fn log_medication(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<LogMedicationRequest>,
) -> Result<(StatusCode, Json<LogMedicationResponse>)> {
    let at = match request.timestamp.as_deref() {
        Some(raw) => Some(parse_iso_timestamp(raw)?),
        None => None,
    };

    let log = analytics::log_medication(state.db.pool(), &user_id, at).await?;
    Ok((
        StatusCode::CREATED,
        Json(LogMedicationResponse {
            message: "Medication time logged successfully".to_string(),
            log,
        }),
    ))
}

fn parse_iso_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| ApiError::BadRequest("Invalid timestamp format. Use ISO 8601.".to_string()))
}

/// Response wrapper for the per-intake comparison.
#[derive(Serialize)]
pub struct MedicationResponseBody {
    pub medication_response: Vec<MedicationResponse>,
}

/// Before/after tremor comparison for every logged intake.
pub async fn medication_response(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MedicationResponseBody>> {
    let response = analytics::medication_response(state.db.pool(), &user_id).await?;
    Ok(Json(MedicationResponseBody {
        medication_response: response,
    }))
}
