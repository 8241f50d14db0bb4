use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::infra::app_state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let catalog = state.catalog.status().await;
    let in_flight = match &state.dispatcher {
        Some(dispatcher) => dispatcher.in_flight().await.len(),
        None => 0,
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "catalog": {
            "items": catalog.items,
            "built_at": catalog.built_at,
            "checked_at": catalog.checked_at,
        },
        "enqueue_enabled": state.dispatcher.is_some(),
        "jobs_in_flight": in_flight,
    }))
}
