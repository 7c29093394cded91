//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with playback, management and metrics endpoints
//! - Playback handler feeding the DASH stream server
//! - Stream management (create, list, delete, publish)
//! - Request-scoped response writer
//! - CORS and request logging middleware

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod streams;

pub use response::{HttpConnection, ResponseWriter};
pub use routes::create_router;
