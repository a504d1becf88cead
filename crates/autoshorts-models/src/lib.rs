//! Shared data models for the AutoShorts harvester.
//!
//! This crate provides Serde-serializable types for:
//! - Videos, statistics, channels and categories
//! - Most-replayed moments and transcripts
//! - Download configuration and the on-disk / object-storage layout
//!
//! It also owns the pure transformations the pipeline relies on:
//! - Safe lookups into loosely-typed API payloads (`json_path`)
//! - Raw payload normalization into typed records (`normalize`)
//! - Publication date window filtering (`date_filter`)

pub mod category;
pub mod channel;
pub mod dataset;
pub mod date_filter;
pub mod download;
pub mod error;
pub mod json_path;
pub mod layout;
pub mod moments;
pub mod normalize;
pub mod persisted;
pub mod transcript;
pub mod utils;
pub mod video;

// Re-export common types
pub use category::VideoCategory;
pub use channel::{uploads_playlist_id, ChannelRecord, PlaylistPage};
pub use dataset::{DatasetFilter, DatasetManifest};
pub use date_filter::{parse_date_bound, select_by_date, DateWindow, Published};
pub use download::{DownloadConfig, DownloadParams, VideoSidecar, DEFAULT_RESOLUTION};
pub use error::{ModelError, ModelResult};
pub use json_path::{safe_get, safe_get_path, PathKey};
pub use moments::ReplayMoment;
pub use persisted::PersistedVideoRow;
pub use transcript::{Language, TranscriptItem, TranscriptSet, TranscriptTrack};
pub use utils::{extract_youtube_id, resolve_video_id, YoutubeIdError, YoutubeIdResult};
pub use video::{
    parse_iso8601_duration, VideoId, VideoRecord, VideoRecordWithStats, VideoStatistics,
    UNCATEGORIZED,
};
