//! YouTube client configuration.

use std::time::Duration;

use reqwest::Client;

use crate::error::{YoutubeError, YoutubeResult};

const DEFAULT_DATA_API_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_REPLAY_API_URL: &str = "https://yt.lemnoslife.com";
const DEFAULT_WATCH_URL: &str = "https://www.youtube.com";

/// Endpoints, credentials and HTTP tuning for all YouTube-facing clients.
#[derive(Debug, Clone)]
pub struct YoutubeConfig {
    /// Data API v3 key
    pub api_key: String,
    /// Data API base URL
    pub data_api_url: String,
    /// Base URL of the service exposing `mostReplayed`
    pub replay_api_url: String,
    /// Base URL for watch pages and the innertube player endpoint
    pub watch_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Reject transcript sets whose generated tracks disagree on language
    pub strict_transcript_languages: bool,
}

impl YoutubeConfig {
    /// Config pointing at the public endpoints.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            data_api_url: DEFAULT_DATA_API_URL.to_string(),
            replay_api_url: DEFAULT_REPLAY_API_URL.to_string(),
            watch_url: DEFAULT_WATCH_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            strict_transcript_languages: false,
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> YoutubeResult<Self> {
        let api_key = std::env::var("YOUTUBE_API_KEY")
            .or_else(|_| std::env::var("GCP_API_KEY"))
            .map_err(|_| YoutubeError::config_error("YOUTUBE_API_KEY or GCP_API_KEY must be set"))?;

        if api_key.trim().is_empty() {
            return Err(YoutubeError::config_error("YOUTUBE_API_KEY cannot be empty"));
        }

        let timeout_secs: u64 = std::env::var("YOUTUBE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let connect_timeout_secs: u64 = std::env::var("YOUTUBE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            api_key,
            data_api_url: std::env::var("YOUTUBE_DATA_API_URL")
                .unwrap_or_else(|_| DEFAULT_DATA_API_URL.to_string()),
            replay_api_url: std::env::var("REPLAY_API_URL")
                .unwrap_or_else(|_| DEFAULT_REPLAY_API_URL.to_string()),
            watch_url: std::env::var("YOUTUBE_WATCH_URL")
                .unwrap_or_else(|_| DEFAULT_WATCH_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            strict_transcript_languages: std::env::var("TRANSCRIPT_STRICT_LANGUAGES")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    /// Shared HTTP client with pooling and timeouts applied.
    pub fn http_client(&self) -> YoutubeResult<Client> {
        Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("autoshorts-youtube/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(YoutubeError::Network)
    }
}
