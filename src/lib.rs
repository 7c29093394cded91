//! DASH Segment Server
//!
//! Request routing for a live DASH segment server: playback requests for
//! manifests (`.mpd`) and segments (`.m4s`) are classified by extension,
//! resolved against an ordered registry of stream providers, and answered
//! with protocol-correct headers while outbound bytes are attributed to the
//! serving stream's metrics.

pub mod config;
pub mod config_file;
pub mod dash;
pub mod error;
pub mod http;
pub mod metrics;
pub mod provider;
pub mod state;
pub mod types;


pub use dash::DashStreamServer;
pub use error::{Result, ServerError};
pub use http::{create_router, HttpConnection, ResponseWriter};
pub use provider::{PlaylistQuery, ProviderRegistry, StreamProvider};
pub use state::AppState;
pub use types::{PublisherType, RequestInfo, SegmentDataType, SegmentItem, StreamInfo};
