//! Axum router configuration

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::metrics_handler;
use crate::state::AppState;

use super::handlers::{health_check, stream_request, version_check};
use super::middleware::request_logger;
use super::streams::{create_stream, delete_stream, list_streams, publish_manifest, push_segment};

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    // Bodies up to the store limit plus 1 MiB reach the handler; the store
    // rejects anything over its own limit.
    let upload_limit = state
        .config
        .store
        .max_segment_size_bytes()
        .saturating_add(1024 * 1024);

    let router = Router::new()
        // Health and version endpoints
        .route("/health", get(health_check))
        .route("/version", get(version_check))
        .route("/metrics", get(metrics_handler))
        // Stream management
        .route("/api/v1/streams", get(list_streams).post(create_stream))
        .route("/api/v1/streams/{app}/{stream}", delete(delete_stream))
        .route(
            "/api/v1/streams/{app}/{stream}/manifest/{file}",
            put(publish_manifest),
        )
        .route(
            "/api/v1/streams/{app}/{stream}/segments/{file}",
            put(push_segment).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Playback: /{app}/{stream}/{file}
        .route("/{*path}", get(stream_request))
        // Middleware
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http());

    let router = if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS, Method::HEAD])
            .allow_headers([
                header::ACCEPT,
                header::RANGE,
                header::CONTENT_TYPE,
                header::ORIGIN,
            ])
            .allow_private_network(true)
            .max_age(Duration::from_secs(3600));
        router.layer(cors)
    } else {
        router
    };

    router.with_state(state)
}
