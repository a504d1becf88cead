//! Media downloader configuration.

use std::path::PathBuf;
use std::time::Duration;

/// yt-dlp invocation settings.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// yt-dlp executable name or path
    pub ytdlp_binary: String,
    /// Netscape cookies file for authenticated downloads
    pub cookies_path: Option<PathBuf>,
    /// Base URL used to build watch URLs from video ids
    pub watch_url: String,
    /// Upper bound on a single download
    pub timeout: Duration,
    /// Value for yt-dlp `--limit-rate`
    pub rate_limit: Option<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ytdlp_binary: "yt-dlp".to_string(),
            cookies_path: None,
            watch_url: "https://www.youtube.com".to_string(),
            timeout: Duration::from_secs(1800),
            rate_limit: None,
        }
    }
}

impl MediaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ytdlp_binary: std::env::var("YTDLP_PATH").unwrap_or(defaults.ytdlp_binary),
            cookies_path: std::env::var("YTDLP_COOKIES_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            watch_url: std::env::var("YOUTUBE_WATCH_URL").unwrap_or(defaults.watch_url),
            timeout: std::env::var("YTDLP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            rate_limit: std::env::var("YTDLP_RATE_LIMIT").ok().filter(|r| !r.is_empty()),
        }
    }
}
