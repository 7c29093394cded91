//! Core value types shared by the router, providers and metrics.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// Build the `#vhost#app` name streams are scoped by.
pub fn vhost_app_name(vhost: &str, app: &str) -> String {
    format!("#{}#{}", vhost, app)
}

/// Text after the last `.` of a file name; empty when there is none.
pub fn file_extension(file_name: &str) -> &str {
    file_name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

/// A parsed playback request: `/<app>/<stream>/<file>` on a virtual host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub vhost: String,
    pub app: String,
    pub stream: String,
    pub file_name: String,
    /// Text after the last `.` of `file_name`; empty when there is none.
    pub file_ext: String,
}

impl RequestInfo {
    /// Parse a request path relative to the server root.
    ///
    /// Returns `None` unless the path has exactly three non-empty segments.
    pub fn parse(vhost: &str, path: &str) -> Option<RequestInfo> {
        if vhost.is_empty() {
            return None;
        }
        let path = path.strip_prefix('/').unwrap_or(path);
        let caps = regex!(r"^([^/]+)/([^/]+)/([^/]+)$").captures(path)?;
        let file_name = caps[3].to_string();
        let file_ext = file_extension(&file_name).to_string();

        Some(RequestInfo {
            vhost: vhost.to_string(),
            app: caps[1].to_string(),
            stream: caps[2].to_string(),
            file_name,
            file_ext,
        })
    }

    pub fn vhost_app_name(&self) -> String {
        vhost_app_name(&self.vhost, &self.app)
    }
}

impl fmt::Display for RequestInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}/{}], {}",
            self.vhost_app_name(),
            self.stream,
            self.file_name
        )
    }
}

/// Runtime identity of a live stream. Providers hand these out; the
/// metrics registry keys its per-stream counters on `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub id: Uuid,
    pub vhost: String,
    pub app: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl StreamInfo {
    pub fn new(vhost: &str, app: &str, name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            vhost: vhost.to_string(),
            app: app.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    /// `#vhost#app/stream`
    pub fn key(&self) -> String {
        stream_key(&self.vhost, &self.app, &self.name)
    }
}

/// Key a stream by vhost, application and name.
pub fn stream_key(vhost: &str, app: &str, stream: &str) -> String {
    format!("{}/{}", vhost_app_name(vhost, app), stream)
}

/// Media carried by a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentDataType {
    Video,
    Audio,
}

/// A packaged media segment, owned by the provider that produced it.
#[derive(Debug, Clone)]
pub struct SegmentItem {
    pub data_type: SegmentDataType,
    pub data: Bytes,
}

impl SegmentItem {
    pub fn new(data_type: SegmentDataType, data: impl Into<Bytes>) -> Self {
        Self {
            data_type,
            data: data.into(),
        }
    }
}

/// Delivery protocol that outbound bytes are attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublisherType {
    Dash,
}

impl PublisherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublisherType::Dash => "dash",
        }
    }
}

impl fmt::Display for PublisherType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
