//! YouTube clients for the AutoShorts harvester.
//!
//! - [`client`]: Data API v3 (videos, playlists, search, channels, categories)
//! - [`channel`]: paginated channel upload listing
//! - [`replay`]: "most replayed" heatmap probe
//! - [`transcript`]: caption track fetching
//!
//! Each external service sits behind a trait so orchestrators can be tested
//! with in-memory fakes.

pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod replay;
pub mod search;
pub mod transcript;

#[cfg(test)]
mod testing;

pub use channel::ChannelLister;
pub use client::{
    PlatformApi, SearchOrder, SearchPage, SearchQuery, VideoPage, YoutubeDataClient,
    MAX_IDS_PER_REQUEST,
};
pub use config::YoutubeConfig;
pub use error::{YoutubeError, YoutubeResult};
pub use replay::{parse_replay_response, LemnosLifeReplayClient, ReplayProbe};
pub use search::{collect_most_popular, collect_search_ids};
pub use transcript::{InnertubeTranscriptClient, TranscriptSource};
