//! Stream providers
//!
//! A [`StreamProvider`] owns a set of live streams and answers playlist and
//! segment queries for them. Providers are registered with a
//! [`ProviderRegistry`] and scanned in registration order by the DASH router.

pub mod memory;
pub mod registry;

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use std::sync::Arc;

use crate::dash::{PlaylistType, SegmentType};
use crate::types::{RequestInfo, SegmentItem, StreamInfo};

pub use memory::MemoryProvider;
pub use registry::ProviderRegistry;

/// Answer to a playlist query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistQuery {
    /// The provider owns the stream and produced the playlist text.
    Ready(String),
    /// The provider does not know the stream; the next provider is asked.
    NotFound,
    /// The provider owns the stream but cannot serve the playlist. The
    /// status and body are sent to the client unchanged.
    Failed { status: StatusCode, body: Bytes },
}

impl PlaylistQuery {
    pub fn failed(status: StatusCode, body: impl Into<Bytes>) -> Self {
        PlaylistQuery::Failed {
            status,
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Short provider name, used in logs and for deregistration.
    fn name(&self) -> &str;

    /// Look up the runtime handle of a stream this provider owns.
    fn get_stream(&self, vhost: &str, app: &str, stream: &str) -> Option<Arc<StreamInfo>>;

    /// Produce the playlist named by `request`.
    async fn playlist(&self, request: &RequestInfo, kind: PlaylistType) -> PlaylistQuery;

    /// Fetch the segment named by `request`, or `None` if this provider
    /// cannot serve it.
    async fn segment(&self, request: &RequestInfo, kind: SegmentType) -> Option<Arc<SegmentItem>>;
}
