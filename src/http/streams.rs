//! Stream management handlers
//!
//! Create, list and delete streams on the in-memory provider, and publish
//! manifests and segments into them.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Result, ServerError};
use crate::provider::memory::LiveStream;
use crate::state::AppState;
use crate::types::{SegmentDataType, SegmentItem};

/// Request to create a new stream
#[derive(Debug, Deserialize)]
pub struct CreateStreamRequest {
    /// Virtual host (configured default if omitted)
    pub vhost: Option<String>,
    pub app: String,
    pub stream: String,
}

#[derive(Debug, Serialize)]
pub struct StreamSummary {
    pub id: String,
    pub vhost: String,
    pub app: String,
    pub stream: String,
    /// Playback URL of the published manifest, relative to the server root
    pub manifest_path: Option<String>,
    pub ready: bool,
    pub segment_count: usize,
    pub segment_bytes: usize,
    pub bytes_out: u64,
    pub created_at: String,
}

/// List of active streams
#[derive(Debug, Serialize)]
pub struct StreamListResponse {
    pub count: usize,
    pub streams: Vec<StreamSummary>,
}

/// `?vhost=` selector shared by the management endpoints
#[derive(Debug, Default, Deserialize)]
pub struct VhostQuery {
    pub vhost: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SegmentQuery {
    pub vhost: Option<String>,
    /// `video` (default) or `audio`
    pub kind: Option<String>,
}

fn vhost_or_default(state: &AppState, vhost: Option<String>) -> String {
    vhost.unwrap_or_else(|| state.config.default_vhost.clone())
}

fn summarize(state: &AppState, stream: &LiveStream) -> StreamSummary {
    let info = stream.info();
    StreamSummary {
        id: info.id.to_string(),
        vhost: info.vhost.clone(),
        app: info.app.clone(),
        stream: info.name.clone(),
        manifest_path: stream
            .manifest_file_name()
            .map(|file| format!("/{}/{}/{}", info.app, info.name, file)),
        ready: stream.is_ready(),
        segment_count: stream.segment_count(),
        segment_bytes: stream.segment_bytes(),
        bytes_out: state
            .metrics
            .lookup(info)
            .map(|m| m.total_bytes_out())
            .unwrap_or(0),
        created_at: info.created_at.to_rfc3339(),
    }
}

fn parse_segment_kind(kind: Option<&str>) -> Result<SegmentDataType> {
    match kind {
        None | Some("video") => Ok(SegmentDataType::Video),
        Some("audio") => Ok(SegmentDataType::Audio),
        Some(other) => Err(ServerError::InvalidRequest(format!(
            "unknown segment kind: {}",
            other
        ))),
    }
}

/// Create a new stream
/// POST /api/v1/streams
pub async fn create_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateStreamRequest>,
) -> Result<Response> {
    let vhost = vhost_or_default(&state, request.vhost);
    let stream = state
        .store
        .create_stream(&vhost, &request.app, &request.stream)?;

    Ok((StatusCode::CREATED, Json(summarize(&state, &stream))).into_response())
}

/// List all streams
/// GET /api/v1/streams
pub async fn list_streams(State(state): State<Arc<AppState>>) -> Json<StreamListResponse> {
    let streams: Vec<_> = state
        .store
        .streams()
        .iter()
        .map(|s| summarize(&state, s))
        .collect();

    Json(StreamListResponse {
        count: streams.len(),
        streams,
    })
}

/// Delete a stream
/// DELETE /api/v1/streams/{app}/{stream}
pub async fn delete_stream(
    State(state): State<Arc<AppState>>,
    Path((app, stream)): Path<(String, String)>,
    Query(query): Query<VhostQuery>,
) -> Result<StatusCode> {
    let vhost = vhost_or_default(&state, query.vhost);
    state.store.delete_stream(&vhost, &app, &stream)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Publish the stream's manifest
/// PUT /api/v1/streams/{app}/{stream}/manifest/{file}
pub async fn publish_manifest(
    State(state): State<Arc<AppState>>,
    Path((app, stream, file)): Path<(String, String, String)>,
    Query(query): Query<VhostQuery>,
    body: String,
) -> Result<StatusCode> {
    let vhost = vhost_or_default(&state, query.vhost);
    state
        .store
        .publish_manifest(&vhost, &app, &stream, &file, body)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Push a segment into the stream's window
/// PUT /api/v1/streams/{app}/{stream}/segments/{file}?kind=video|audio
pub async fn push_segment(
    State(state): State<Arc<AppState>>,
    Path((app, stream, file)): Path<(String, String, String)>,
    Query(query): Query<SegmentQuery>,
    body: Bytes,
) -> Result<StatusCode> {
    let kind = parse_segment_kind(query.kind.as_deref())?;
    let vhost = vhost_or_default(&state, query.vhost);
    state
        .store
        .push_segment(&vhost, &app, &stream, &file, SegmentItem::new(kind, body))?;
    Ok(StatusCode::NO_CONTENT)
}
