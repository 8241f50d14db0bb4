use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{
    handlers::{catalog, enqueue, files, health},
    infra::{app_state::AppState, config::ServerConfig},
    middleware::auth::require_api_key,
};

/// Builds the complete router: catalog API, file serving and, when
/// enabled, the bearer-gated enqueue routes.
pub fn create_router(state: AppState) -> Router {
    let file_route = format!(
        "{}/{{id}}/{{*path}}",
        state.library.layout().file_route.trim_end_matches('/')
    );

    let mut router = Router::new()
        .route("/api/videos", get(catalog::list_videos))
        .route("/api/videos/{id}", get(catalog::get_video_detail))
        .route("/api/health", get(health::health))
        .route(&file_route, get(files::serve_item_file));

    if state.dispatcher.is_some() {
        router = router.merge(create_enqueue_routes(state.clone()));
    }

    router
        .layer(cors_layer(&state.config.server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn create_enqueue_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/addvideo/", get(enqueue::add_video_without_id))
        .route("/api/addvideo/{id}", get(enqueue::add_video))
        .route("/process", post(enqueue::process))
        .route_layer(middleware::from_fn_with_state(state, require_api_key))
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let allow_origin = if server.cors_allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
