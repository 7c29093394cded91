//! HTTP request handlers
//!
//! Health, version and the playback entry point.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::response::ResponseWriter;
use crate::state::AppState;
use crate::types::RequestInfo;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Version information endpoint
pub async fn version_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "online",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": state.providers.names(),
    }))
}

/// Playback endpoint
/// GET /{app}/{stream}/{file}
pub async fn stream_request(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(path): Path<String>,
) -> Response {
    state.metrics.record_request("stream");

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let vhost = state.config.resolve_vhost(host);

    let Some(request) = RequestInfo::parse(vhost, &path) else {
        tracing::debug!("Malformed stream path: {}", path);
        state.metrics.record_response(StatusCode::NOT_FOUND);
        return StatusCode::NOT_FOUND.into_response();
    };

    let mut response = ResponseWriter::new();
    let _ = state
        .dash
        .process_stream_request(&mut response, &request)
        .await;

    state.metrics.record_response(response.status());
    response.into_response()
}
