use axum::extract::{Path, State};
use tracing::debug;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// GET /api/addvideo/{id}
pub async fn add_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<String> {
    enqueue(&state, &id).await
}

/// GET /api/addvideo/ - an empty identifier, rejected after the bearer gate.
pub async fn add_video_without_id(State(state): State<AppState>) -> AppResult<String> {
    enqueue(&state, "").await
}

/// POST /process - the identifier is the raw request body.
pub async fn process(State(state): State<AppState>, body: String) -> AppResult<String> {
    enqueue(&state, body.trim()).await
}

async fn enqueue(state: &AppState, raw: &str) -> AppResult<String> {
    let dispatcher = state
        .dispatcher
        .as_ref()
        .ok_or_else(|| AppError::not_found("Enqueueing is disabled"))?;

    let dispatch = dispatcher.enqueue(raw).await?;
    if dispatch.coalesced {
        debug!(item_id = %dispatch.status.id(), "request joined an in-flight job");
    }
    // The job keeps running after its ticket is dropped.
    Ok(dispatch.status.to_string())
}
