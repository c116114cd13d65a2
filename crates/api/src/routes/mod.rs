//! Route handlers for the analytics API.

pub mod health;
pub mod medication;
pub mod readings;
pub mod shake;
pub mod trend;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Shake metrics
        .route("/tremor/log", post(shake::log_shake))
        .route("/tremor/:user_id/shake-by-minute", get(shake::shake_by_minute))
        // Medication tracking
        .route(
            "/tremor/:user_id/medication-effect",
            get(medication::medication_effect),
        )
        .route(
            "/tremor/:user_id/log-medication",
            post(medication::log_medication),
        )
        .route(
            "/tremor/:user_id/medication-response",
            get(medication::medication_response),
        )
        // Trend prediction
        .route("/tremor/:user_id/train-trend", post(trend::train))
        .route("/tremor/:user_id/predict-trend", get(trend::predict))
        // Stored readings
        .route("/devices/:device_id/readings", get(readings::list_readings))
}
