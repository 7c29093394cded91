//! In-memory live stream provider
//!
//! Streams are created and fed over the management API: a packager
//! uploads the manifest and pushes segments, and the provider serves them
//! back to players. Each stream keeps a sliding window of the most recent
//! segments.

use async_trait::async_trait;
use axum::http::StatusCode;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

use super::{PlaylistQuery, StreamProvider};
use crate::config::StoreConfig;
use crate::dash::{classify, PlaylistType, RequestKind, SegmentType};
use crate::error::{Result, ServerError};
use crate::metrics::Metrics;
use crate::types::{file_extension, stream_key, RequestInfo, SegmentItem, StreamInfo};

struct Manifest {
    file_name: String,
    text: String,
}

/// A live stream and its current window
pub struct LiveStream {
    info: Arc<StreamInfo>,
    manifest: RwLock<Option<Manifest>>,
    segments: RwLock<VecDeque<(String, Arc<SegmentItem>)>>,
}

impl LiveStream {
    fn new(info: StreamInfo) -> Self {
        Self {
            info: Arc::new(info),
            manifest: RwLock::new(None),
            segments: RwLock::new(VecDeque::new()),
        }
    }

    pub fn info(&self) -> &Arc<StreamInfo> {
        &self.info
    }

    pub fn is_ready(&self) -> bool {
        self.manifest.read().is_some()
    }

    /// File name the current manifest was published under
    pub fn manifest_file_name(&self) -> Option<String> {
        self.manifest.read().as_ref().map(|m| m.file_name.clone())
    }

    pub fn segment_count(&self) -> usize {
        self.segments.read().len()
    }

    pub fn segment_bytes(&self) -> usize {
        self.segments.read().iter().map(|(_, s)| s.data.len()).sum()
    }

    fn segment(&self, file_name: &str) -> Option<Arc<SegmentItem>> {
        self.segments
            .read()
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, item)| item.clone())
    }
}

pub struct MemoryProvider {
    streams: DashMap<String, Arc<LiveStream>>,
    metrics: Arc<Metrics>,
    config: StoreConfig,
}

impl MemoryProvider {
    pub const NAME: &'static str = "memory";

    pub fn new(config: StoreConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            streams: DashMap::new(),
            metrics,
            config,
        }
    }

    /// Create a stream and bind its metrics.
    pub fn create_stream(&self, vhost: &str, app: &str, name: &str) -> Result<Arc<LiveStream>> {
        for (field, value) in [("vhost", vhost), ("app", app), ("stream", name)] {
            if value.is_empty() || value.contains('/') {
                return Err(ServerError::InvalidRequest(format!(
                    "invalid {} name: {:?}",
                    field, value
                )));
            }
        }

        let key = stream_key(vhost, app, name);
        let stream = match self.streams.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(ServerError::StreamExists(key));
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => entry
                .insert(Arc::new(LiveStream::new(StreamInfo::new(vhost, app, name))))
                .clone(),
        };

        self.metrics.register_stream(stream.info());
        tracing::info!("Created stream {} ({})", key, stream.info().id);
        Ok(stream)
    }

    /// Remove a stream and drop its metrics.
    pub fn delete_stream(&self, vhost: &str, app: &str, name: &str) -> Result<Arc<LiveStream>> {
        let key = stream_key(vhost, app, name);
        let (_, stream) = self
            .streams
            .remove(&key)
            .ok_or(ServerError::StreamNotFound(key.clone()))?;

        self.metrics.unregister_stream(stream.info());
        tracing::info!("Deleted stream {}", key);
        Ok(stream)
    }

    pub fn stream(&self, vhost: &str, app: &str, name: &str) -> Option<Arc<LiveStream>> {
        self.streams
            .get(&stream_key(vhost, app, name))
            .map(|r| r.clone())
    }

    fn stream_or_error(&self, vhost: &str, app: &str, name: &str) -> Result<Arc<LiveStream>> {
        self.stream(vhost, app, name)
            .ok_or_else(|| ServerError::StreamNotFound(stream_key(vhost, app, name)))
    }

    /// All streams, ordered by key
    pub fn streams(&self) -> Vec<Arc<LiveStream>> {
        let mut streams: Vec<_> = self.streams.iter().map(|r| r.value().clone()).collect();
        streams.sort_by_key(|s| s.info().key());
        streams
    }

    /// Replace the stream's manifest. The file name must carry a playlist
    /// extension so players can request it.
    pub fn publish_manifest(
        &self,
        vhost: &str,
        app: &str,
        name: &str,
        file_name: &str,
        text: String,
    ) -> Result<()> {
        if file_name.contains('/')
            || !matches!(
                classify(file_extension(file_name)),
                Some(RequestKind::Playlist(_))
            )
        {
            return Err(ServerError::InvalidRequest(format!(
                "not a playlist file name: {:?}",
                file_name
            )));
        }

        let stream = self.stream_or_error(vhost, app, name)?;
        tracing::debug!(
            "Published manifest {} ({} bytes) for {}",
            file_name,
            text.len(),
            stream.info().key()
        );
        *stream.manifest.write() = Some(Manifest {
            file_name: file_name.to_string(),
            text,
        });
        Ok(())
    }

    /// Append a segment to the stream's window, evicting the oldest ones
    /// beyond the configured window size. Re-pushing a file name replaces it.
    pub fn push_segment(
        &self,
        vhost: &str,
        app: &str,
        name: &str,
        file_name: &str,
        segment: SegmentItem,
    ) -> Result<()> {
        let limit = self.config.max_segment_size_bytes();
        if segment.data.len() > limit {
            return Err(ServerError::PayloadTooLarge {
                size: segment.data.len(),
                limit,
            });
        }

        let stream = self.stream_or_error(vhost, app, name)?;
        let mut segments = stream.segments.write();
        segments.retain(|(existing, _)| existing != file_name);
        segments.push_back((file_name.to_string(), Arc::new(segment)));
        while segments.len() > self.config.max_segments_per_stream.max(1) {
            if let Some((evicted, _)) = segments.pop_front() {
                tracing::trace!("Evicted segment {} from {}", evicted, stream.info().key());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StreamProvider for MemoryProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_stream(&self, vhost: &str, app: &str, stream: &str) -> Option<Arc<StreamInfo>> {
        self.stream(vhost, app, stream).map(|s| s.info().clone())
    }

    async fn playlist(&self, request: &RequestInfo, _kind: PlaylistType) -> PlaylistQuery {
        let Some(stream) = self.stream(&request.vhost, &request.app, &request.stream) else {
            return PlaylistQuery::NotFound;
        };

        let manifest = stream.manifest.read();
        match manifest.as_ref() {
            None => PlaylistQuery::failed(StatusCode::SERVICE_UNAVAILABLE, "stream is not ready"),
            Some(m) if m.file_name != request.file_name => {
                PlaylistQuery::failed(StatusCode::NOT_FOUND, "")
            }
            Some(m) => PlaylistQuery::Ready(m.text.clone()),
        }
    }

    async fn segment(&self, request: &RequestInfo, _kind: SegmentType) -> Option<Arc<SegmentItem>> {
        self.stream(&request.vhost, &request.app, &request.stream)?
            .segment(&request.file_name)
    }
}
