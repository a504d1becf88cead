//! Video id parsing for user input.
//!
//! The CLI accepts either bare 11-character ids or any of the common
//! YouTube URL shapes; everything downstream works on bare ids.

use url::Url;

/// Errors that can occur during YouTube ID extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YoutubeIdError {
    /// Input is not a YouTube URL
    InvalidYoutubeUrl,
    /// Video ID has invalid format
    InvalidVideoId,
    /// Video ID not found in URL
    VideoIdNotFound,
}

impl std::fmt::Display for YoutubeIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YoutubeIdError::InvalidYoutubeUrl => write!(f, "URL is not a valid YouTube URL"),
            YoutubeIdError::InvalidVideoId => write!(f, "Video ID has invalid format"),
            YoutubeIdError::VideoIdNotFound => write!(f, "Video ID not found in URL"),
        }
    }
}

impl std::error::Error for YoutubeIdError {}

/// Result type for YouTube ID extraction.
pub type YoutubeIdResult<T> = Result<T, YoutubeIdError>;

/// Path prefixes that are followed directly by the video id.
const ID_PATH_PREFIXES: &[&str] = &["embed", "v", "shorts", "live"];

/// Extract the video id from a YouTube URL.
///
/// Handles `watch?v=`, `youtu.be/`, `/embed/`, `/v/`, `/shorts/` and
/// `/live/` forms, with or without extra query parameters.
pub fn extract_youtube_id(input: &str) -> YoutubeIdResult<String> {
    let url = Url::parse(input.trim()).map_err(|_| YoutubeIdError::InvalidYoutubeUrl)?;
    let host = url
        .host_str()
        .map(|h| h.to_ascii_lowercase())
        .ok_or(YoutubeIdError::InvalidYoutubeUrl)?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if host == "youtu.be" {
        return match segments.first() {
            Some(id) => validate_youtube_id(id),
            None => Err(YoutubeIdError::VideoIdNotFound),
        };
    }

    if !(host == "youtube.com" || host.ends_with(".youtube.com")) {
        return Err(YoutubeIdError::InvalidYoutubeUrl);
    }

    if let Some((_, id)) = url.query_pairs().find(|(k, _)| k == "v") {
        return validate_youtube_id(&id);
    }

    match segments.as_slice() {
        [prefix, id, ..] if ID_PATH_PREFIXES.contains(prefix) => validate_youtube_id(id),
        _ => Err(YoutubeIdError::VideoIdNotFound),
    }
}

/// Accept either a bare video id or a URL and return the bare id.
pub fn resolve_video_id(input: &str) -> YoutubeIdResult<String> {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        extract_youtube_id(trimmed)
    } else {
        validate_youtube_id(trimmed)
    }
}

fn validate_youtube_id(id: &str) -> YoutubeIdResult<String> {
    let valid = id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id.to_string())
    } else {
        Err(YoutubeIdError::InvalidVideoId)
    }
}
