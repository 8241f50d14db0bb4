use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use constant_time_eq::constant_time_eq;
use tracing::warn;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// Requires `Authorization: Bearer <api_key>` when an API key is
/// configured. Runs before the handler extracts the identifier, so an
/// unauthorized request is rejected with 401 whatever its body.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let Some(expected) = state.config.enqueue.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let token = extract_bearer_token(&request)?;
    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        warn!(path = %request.uri().path(), "rejected enqueue request with wrong API key");
        return Err(AppError::unauthorized("Invalid API key"));
    }

    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> AppResult<&str> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Authorization header missing"))?;

    auth_header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::unauthorized("Invalid authorization format"))
}
