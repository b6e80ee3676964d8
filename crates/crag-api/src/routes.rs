//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{get_video_info, health, list_user_jobs, upload_route_video};
use crate::middleware::cors_layer;
use crate::state::AppState;
use crate::ws::ws_jobs;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Clip upload attached to a route record
        .route("/routes/:route_id/video", post(upload_route_video))
        // Transcode state poll (the only place failure is visible)
        .route("/videos/:video_id", get(get_video_info))
        // Delivered-notification history
        .route("/user/jobs", get(list_user_jobs));

    let ws_routes = Router::new().route("/ws/jobs", get(ws_jobs));

    let health_routes = Router::new().route("/health", get(health));

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .merge(health_routes)
        // Uploads are large; lift axum's default multipart cap to the
        // configured limit and enforce that limit for every body.
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
