//! Prometheus-compatible metrics
//!
//! Server-wide request counters plus per-stream outbound byte counters.
//! Stream counters exist only while a stream is bound (see
//! [`Metrics::register_stream`]); reports for unbound streams are dropped.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::state::AppState;
use crate::types::{PublisherType, StreamInfo};

/// Counters for a single stream
#[derive(Debug)]
pub struct StreamMetrics {
    vhost: String,
    app: String,
    stream: String,
    bytes_out: RwLock<HashMap<PublisherType, u64>>,
}

impl StreamMetrics {
    fn new(info: &StreamInfo) -> Self {
        Self {
            vhost: info.vhost.clone(),
            app: info.app.clone(),
            stream: info.name.clone(),
            bytes_out: RwLock::new(HashMap::new()),
        }
    }

    pub fn increase_bytes_out(&self, publisher: PublisherType, bytes: u64) {
        *self.bytes_out.write().entry(publisher).or_insert(0) += bytes;
    }

    pub fn bytes_out(&self, publisher: PublisherType) -> u64 {
        self.bytes_out.read().get(&publisher).copied().unwrap_or(0)
    }

    pub fn total_bytes_out(&self) -> u64 {
        self.bytes_out.read().values().sum()
    }
}

/// Metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Server start time
    start_time: Instant,
    /// Total requests processed
    request_count: RwLock<u64>,
    /// Requests by endpoint
    requests_by_endpoint: RwLock<HashMap<String, u64>>,
    /// Responses by status code
    responses_by_status: RwLock<HashMap<u16, u64>>,
    /// Per-stream counters
    streams: DashMap<Uuid, Arc<StreamMetrics>>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            request_count: RwLock::new(0),
            requests_by_endpoint: RwLock::new(HashMap::new()),
            responses_by_status: RwLock::new(HashMap::new()),
            streams: DashMap::new(),
        }
    }

    /// Record a request
    pub fn record_request(&self, endpoint: &str) {
        *self.request_count.write() += 1;
        *self
            .requests_by_endpoint
            .write()
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    /// Record the status a response went out with
    pub fn record_response(&self, status: StatusCode) {
        *self
            .responses_by_status
            .write()
            .entry(status.as_u16())
            .or_insert(0) += 1;
    }

    /// Bind counters to a stream. Binding twice keeps the existing counters.
    pub fn register_stream(&self, info: &StreamInfo) -> Arc<StreamMetrics> {
        self.streams
            .entry(info.id)
            .or_insert_with(|| Arc::new(StreamMetrics::new(info)))
            .clone()
    }

    /// Drop a stream's counters
    pub fn unregister_stream(&self, info: &StreamInfo) -> Option<Arc<StreamMetrics>> {
        self.streams.remove(&info.id).map(|(_, m)| m)
    }

    /// Counters bound to a stream, if any
    pub fn lookup(&self, info: &StreamInfo) -> Option<Arc<StreamMetrics>> {
        self.streams.get(&info.id).map(|r| r.clone())
    }

    /// Attribute outbound bytes to a stream. Does nothing when the stream
    /// is absent or has no counters bound.
    pub fn record_bytes_out(&self, stream: Option<&StreamInfo>, publisher: PublisherType, bytes: usize) {
        let Some(stream) = stream else {
            return;
        };
        match self.lookup(stream) {
            Some(metrics) => metrics.increase_bytes_out(publisher, bytes as u64),
            None => tracing::trace!("No metrics bound to stream {}", stream.key()),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Export metrics in Prometheus format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        // Server info
        output.push_str("# HELP dash_server_uptime_seconds Server uptime in seconds\n");
        output.push_str("# TYPE dash_server_uptime_seconds counter\n");
        output.push_str(&format!(
            "dash_server_uptime_seconds {}\n",
            self.uptime_secs()
        ));

        output.push_str(
            "\n# HELP dash_server_start_time_seconds Server start time as Unix timestamp\n",
        );
        output.push_str("# TYPE dash_server_start_time_seconds gauge\n");
        output.push_str(&format!(
            "dash_server_start_time_seconds {}\n",
            std::time::SystemTime::UNIX_EPOCH
                .elapsed()
                .unwrap_or(Duration::ZERO)
                .as_secs()
                .saturating_sub(self.uptime_secs())
        ));

        // Request metrics
        output.push_str("\n# HELP dash_requests_total Total number of HTTP requests\n");
        output.push_str("# TYPE dash_requests_total counter\n");
        output.push_str(&format!(
            "dash_requests_total {}\n",
            *self.request_count.read()
        ));

        output.push_str("\n# HELP dash_requests_by_endpoint Requests by endpoint\n");
        output.push_str("# TYPE dash_requests_by_endpoint counter\n");
        for (endpoint, count) in self.requests_by_endpoint.read().iter() {
            output.push_str(&format!(
                "dash_requests_by_endpoint{{endpoint=\"{}\"}} {}\n",
                endpoint, count
            ));
        }

        output.push_str("\n# HELP dash_responses_total Responses by status code\n");
        output.push_str("# TYPE dash_responses_total counter\n");
        for (status, count) in self.responses_by_status.read().iter() {
            output.push_str(&format!(
                "dash_responses_total{{status=\"{}\"}} {}\n",
                status, count
            ));
        }

        // Stream metrics
        output.push_str("\n# HELP dash_active_streams Number of streams with bound metrics\n");
        output.push_str("# TYPE dash_active_streams gauge\n");
        output.push_str(&format!("dash_active_streams {}\n", self.streams.len()));

        output.push_str("\n# HELP dash_stream_bytes_out_total Bytes sent per stream and protocol\n");
        output.push_str("# TYPE dash_stream_bytes_out_total counter\n");
        for entry in self.streams.iter() {
            let stream = entry.value();
            for (publisher, bytes) in stream.bytes_out.read().iter() {
                output.push_str(&format!(
                    "dash_stream_bytes_out_total{{vhost=\"{}\",app=\"{}\",stream=\"{}\",publisher=\"{}\"}} {}\n",
                    escape_label(&stream.vhost),
                    escape_label(&stream.app),
                    escape_label(&stream.stream),
                    publisher,
                    bytes
                ));
            }
        }

        output
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics endpoint handler
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let prometheus_output = state.metrics.export_prometheus();

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        prometheus_output,
    )
        .into_response()
}

/// Escape a label value for the text exposition format.
fn escape_label(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}
