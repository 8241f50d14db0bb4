use axum::{
    body::Body,
    extract::{Path, Request, State},
    response::Response,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// GET {file_route}/{id}/{*path} - serves one file from an item directory.
///
/// The path is checked before any filesystem access, and only regular
/// files are served; content type and range handling come from
/// [`ServeFile`].
pub async fn serve_item_file(
    State(state): State<AppState>,
    Path((id, path)): Path<(String, String)>,
    request: Request,
) -> AppResult<Response> {
    let file = state.library.resolve_file(&id, &path)?;
    // ServeFile answers 200 for a directory and then fails mid-body.
    let is_file = tokio::fs::metadata(&file)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(AppError::not_found("File not found"));
    }
    debug!(item_id = %id, file = %file.display(), "serving file");

    let response = ServeFile::new(&file)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    Ok(response.map(Body::new))
}
