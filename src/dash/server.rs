//! DASH stream server
//!
//! Routes a parsed playback request to the playlist or segment handler and
//! answers it from the first registered provider that can. Every path ends
//! with a finalized response and [`HttpConnection::Closed`].

use axum::http::{header, HeaderValue, StatusCode};
use std::sync::Arc;

use super::classify::{classify, PlaylistType, RequestKind, SegmentType};
use super::define::{
    DASH_AUDIO_CONTENT_TYPE, DASH_MPD_CONTENT_TYPE, DASH_PLAYLIST_CACHE_CONTROL,
    DASH_VIDEO_CONTENT_TYPE,
};
use crate::http::response::{HttpConnection, ResponseWriter};
use crate::metrics::Metrics;
use crate::provider::{PlaylistQuery, ProviderRegistry};
use crate::types::{PublisherType, RequestInfo, SegmentDataType};

pub struct DashStreamServer {
    providers: Arc<ProviderRegistry>,
    metrics: Arc<Metrics>,
}

impl DashStreamServer {
    pub fn new(providers: Arc<ProviderRegistry>, metrics: Arc<Metrics>) -> Self {
        Self { providers, metrics }
    }

    pub fn publisher_name(&self) -> &'static str {
        "DASH"
    }

    pub fn publisher_type(&self) -> PublisherType {
        PublisherType::Dash
    }

    /// Entry point for playback requests.
    pub async fn process_stream_request(
        &self,
        response: &mut ResponseWriter,
        request: &RequestInfo,
    ) -> HttpConnection {
        match classify(&request.file_ext) {
            Some(RequestKind::Playlist(kind)) => {
                self.process_playlist_request(response, request, kind).await
            }
            Some(RequestKind::Segment(kind)) => {
                self.process_segment_request(response, request, kind).await
            }
            None => {
                tracing::debug!(
                    "Unsupported {} request extension '{}' for {}",
                    self.publisher_name(),
                    request.file_ext,
                    request
                );
                response.set_status(StatusCode::NOT_FOUND);
                response.finalize();
                HttpConnection::Closed
            }
        }
    }

    pub async fn process_playlist_request(
        &self,
        response: &mut ResponseWriter,
        request: &RequestInfo,
        kind: PlaylistType,
    ) -> HttpConnection {
        let providers = self.providers.snapshot();

        let mut found = None;
        for provider in providers.iter() {
            match provider.playlist(request, kind).await {
                PlaylistQuery::NotFound => continue,
                PlaylistQuery::Failed { status, body } => {
                    tracing::debug!(
                        "Provider '{}' could not serve a {} playlist for {}: {}",
                        provider.name(),
                        self.publisher_name(),
                        request,
                        status
                    );
                    response.set_status(status);
                    response.append_data(&body);
                    response.finalize();
                    return HttpConnection::Closed;
                }
                PlaylistQuery::Ready(playlist) => {
                    let stream =
                        provider.get_stream(&request.vhost, &request.app, &request.stream);
                    found = Some((playlist, stream));
                    break;
                }
            }
        }

        let Some((playlist, stream)) = found else {
            tracing::debug!(
                "Could not find a {} playlist for {}",
                self.publisher_name(),
                request
            );
            response.set_status(StatusCode::NOT_FOUND);
            response.finalize();
            return HttpConnection::Closed;
        };

        if response.status() != StatusCode::OK || playlist.is_empty() {
            response.finalize();
            return HttpConnection::Closed;
        }

        response.set_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static(DASH_MPD_CONTENT_TYPE),
        );
        response.set_header(
            header::CACHE_CONTROL,
            HeaderValue::from_static(DASH_PLAYLIST_CACHE_CONTROL),
        );
        response.set_header(header::PRAGMA, HeaderValue::from_static("no-cache"));
        response.set_header(header::EXPIRES, HeaderValue::from_static("0"));

        response.append_string(&playlist);
        let sent_bytes = response.finalize();

        self.metrics
            .record_bytes_out(stream.as_deref(), self.publisher_type(), sent_bytes);

        HttpConnection::Closed
    }

    pub async fn process_segment_request(
        &self,
        response: &mut ResponseWriter,
        request: &RequestInfo,
        kind: SegmentType,
    ) -> HttpConnection {
        let providers = self.providers.snapshot();

        // The stream handle is re-resolved for every candidate, so bytes are
        // credited to whatever the last scanned provider resolved, which can
        // differ from the provider that served the segment.
        let mut stream = None;
        let mut segment = None;
        for provider in providers.iter() {
            stream = provider.get_stream(&request.vhost, &request.app, &request.stream);
            if let Some(item) = provider.segment(request, kind).await {
                segment = Some(item);
                break;
            }
        }

        let Some(segment) = segment else {
            tracing::debug!(
                "Could not find a {} segment for {}",
                self.publisher_name(),
                request
            );
            response.set_status(StatusCode::NOT_FOUND);
            response.finalize();
            return HttpConnection::Closed;
        };

        let content_type = match segment.data_type {
            SegmentDataType::Video => DASH_VIDEO_CONTENT_TYPE,
            SegmentDataType::Audio => DASH_AUDIO_CONTENT_TYPE,
        };
        response.set_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        response.append_data(&segment.data);
        let sent_bytes = response.finalize();

        self.metrics
            .record_bytes_out(stream.as_deref(), self.publisher_type(), sent_bytes);

        HttpConnection::Closed
    }
}
