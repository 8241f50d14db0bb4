use std::time::Instant;

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;
use vitrine_model::{CatalogEntry, DetailRecord, ItemId};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// GET /api/videos - the cached listing, most recently modified first.
pub async fn list_videos(State(state): State<AppState>) -> Json<Vec<CatalogEntry>> {
    let snapshot = state.catalog.snapshot().await;
    Json(snapshot.to_vec())
}

/// GET /api/videos/{id} - detail read fresh from disk.
pub async fn get_video_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DetailRecord>> {
    let id = ItemId::parse(id).map_err(|err| AppError::bad_request(err.to_string()))?;
    let started = Instant::now();
    let record = state.details.detail(id).await?;
    info!(item_id = %record.id, elapsed = ?started.elapsed(), "processed detail request");
    Ok(Json(record))
}
