//! DASH request routing
//!
//! Classifies playback requests by file extension and serves playlists
//! (`.mpd`) and segments (`.m4s`) from the registered stream providers.

pub mod classify;
pub mod define;
pub mod server;

pub use classify::{classify, PlaylistType, RequestKind, SegmentType};
pub use server::DashStreamServer;
