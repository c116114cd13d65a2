//! Stored-reading query routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use database::models::Reading;
use database::{device, reading};

use crate::error::Result;
use crate::state::AppState;

/// Pagination query parameters.
#[derive(Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Recent readings for a device, newest first.
pub async fn list_readings(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<Reading>>> {
    let pool = state.db.pool();

    // 404 for devices that were never provisioned.
    device::get_device(pool, &device_id).await?;

    let limit = page.limit.unwrap_or(100);
    let offset = page.offset.unwrap_or(0);
    let rows = reading::list_readings(pool, &device_id, limit, offset).await?;
    Ok(Json(rows))
}
