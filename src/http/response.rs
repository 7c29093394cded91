//! Request-scoped response writer
//!
//! Handlers build a response through [`ResponseWriter`] and call
//! [`ResponseWriter::finalize`] exactly once; the writer is then turned into
//! an axum [`Response`].

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};

/// Connection outcome reported by the stream router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum HttpConnection {
    /// The response is complete; nothing further is written.
    Closed,
}

#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    sent_bytes: Option<usize>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            sent_bytes: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_finalized(&self) -> bool {
        self.sent_bytes.is_some()
    }

    pub fn set_status(&mut self, status: StatusCode) {
        if self.reject_write("status") {
            return;
        }
        self.status = status;
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.reject_write("header") {
            return;
        }
        self.headers.insert(name, value);
    }

    pub fn append_string(&mut self, text: &str) {
        self.append_data(text.as_bytes());
    }

    pub fn append_data(&mut self, data: &[u8]) {
        if self.reject_write("body") {
            return;
        }
        self.body.extend_from_slice(data);
    }

    /// Commit the response and return the number of bytes it puts on the
    /// wire (status line, headers and body). Subsequent calls return 0.
    pub fn finalize(&mut self) -> usize {
        if self.sent_bytes.is_some() {
            return 0;
        }
        let sent = self.head_len() + self.body.len();
        self.sent_bytes = Some(sent);
        sent
    }

    /// Bytes reported by [`finalize`](Self::finalize), if it has run.
    pub fn sent_bytes(&self) -> Option<usize> {
        self.sent_bytes
    }

    // "HTTP/1.1 200 OK\r\n" + "name: value\r\n"* + "\r\n"
    fn head_len(&self) -> usize {
        let status_line = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("")
        );
        let headers: usize = self
            .headers
            .iter()
            .map(|(name, value)| name.as_str().len() + 2 + value.len() + 2)
            .sum();
        status_line.len() + headers + 2
    }

    fn reject_write(&self, what: &str) -> bool {
        if self.is_finalized() {
            tracing::warn!("Ignoring {} write on a finalized response", what);
            return true;
        }
        false
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoResponse for ResponseWriter {
    fn into_response(self) -> Response {
        let body: Bytes = self.body.freeze();
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
