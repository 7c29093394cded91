//! DASH protocol constants

pub const DASH_PLAYLIST_EXT: &str = "mpd";
pub const DASH_SEGMENT_EXT: &str = "m4s";

pub const DASH_MPD_CONTENT_TYPE: &str = "application/dash+xml";
pub const DASH_VIDEO_CONTENT_TYPE: &str = "video/mp4";
pub const DASH_AUDIO_CONTENT_TYPE: &str = "audio/mp4";

pub const DASH_PLAYLIST_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";
