//! Test fixtures
//!
//! A scriptable provider and helpers for building requests and app state.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::dash::{PlaylistType, SegmentType};
use crate::provider::{PlaylistQuery, StreamProvider};
use crate::state::AppState;
use crate::types::{RequestInfo, SegmentItem, StreamInfo};

/// Request on the default vhost for `app/live/<file_name>`.
pub fn request(file_name: &str, file_ext: &str) -> RequestInfo {
    RequestInfo {
        vhost: "default".to_string(),
        app: "app".to_string(),
        stream: "live".to_string(),
        file_name: file_name.to_string(),
        file_ext: file_ext.to_string(),
    }
}

/// App state with test-friendly defaults.
pub fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    }))
}

/// Provider with fixed answers that counts how often it is asked.
pub struct MockProvider {
    name: String,
    only_stream: Option<String>,
    stream: Option<Arc<StreamInfo>>,
    playlist: PlaylistQuery,
    segment: Option<Arc<SegmentItem>>,
    pub resolve_calls: AtomicUsize,
    pub playlist_calls: AtomicUsize,
    pub segment_calls: AtomicUsize,
}

impl MockProvider {
    /// A provider that knows no streams.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            only_stream: None,
            stream: None,
            playlist: PlaylistQuery::NotFound,
            segment: None,
            resolve_calls: AtomicUsize::new(0),
            playlist_calls: AtomicUsize::new(0),
            segment_calls: AtomicUsize::new(0),
        }
    }

    /// Answer only for requests naming `stream`.
    pub fn for_stream(mut self, stream: &str) -> Self {
        self.only_stream = Some(stream.to_string());
        self
    }

    pub fn with_stream(mut self, stream: Arc<StreamInfo>) -> Self {
        self.stream = Some(stream);
        self
    }

    pub fn with_playlist(self, playlist: &str) -> Self {
        self.with_playlist_query(PlaylistQuery::Ready(playlist.to_string()))
    }

    pub fn with_playlist_query(mut self, query: PlaylistQuery) -> Self {
        self.playlist = query;
        self
    }

    pub fn with_segment(mut self, segment: SegmentItem) -> Self {
        self.segment = Some(Arc::new(segment));
        self
    }

    fn serves(&self, stream: &str) -> bool {
        self.only_stream.as_deref().map_or(true, |s| s == stream)
    }
}

#[async_trait]
impl StreamProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_stream(&self, _vhost: &str, _app: &str, stream: &str) -> Option<Arc<StreamInfo>> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if !self.serves(stream) {
            return None;
        }
        self.stream.clone()
    }

    async fn playlist(&self, request: &RequestInfo, _kind: PlaylistType) -> PlaylistQuery {
        self.playlist_calls.fetch_add(1, Ordering::SeqCst);
        if !self.serves(&request.stream) {
            return PlaylistQuery::NotFound;
        }
        self.playlist.clone()
    }

    async fn segment(&self, request: &RequestInfo, _kind: SegmentType) -> Option<Arc<SegmentItem>> {
        self.segment_calls.fetch_add(1, Ordering::SeqCst);
        if !self.serves(&request.stream) {
            return None;
        }
        self.segment.clone()
    }
}
