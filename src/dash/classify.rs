//! Request classification by file extension

use super::define::{DASH_PLAYLIST_EXT, DASH_SEGMENT_EXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistType {
    Mpd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentType {
    M4s,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Playlist(PlaylistType),
    Segment(SegmentType),
}

/// Map a file extension to a request kind. Matching is exact and
/// case-sensitive; anything unrecognised yields `None`.
pub fn classify(file_ext: &str) -> Option<RequestKind> {
    match file_ext {
        DASH_PLAYLIST_EXT => Some(RequestKind::Playlist(PlaylistType::Mpd)),
        DASH_SEGMENT_EXT => Some(RequestKind::Segment(SegmentType::M4s)),
        _ => None,
    }
}
