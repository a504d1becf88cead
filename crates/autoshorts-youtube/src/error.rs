//! YouTube client error types.

use thiserror::Error;

use autoshorts_models::ModelError;

/// Result type for YouTube operations.
pub type YoutubeResult<T> = Result<T, YoutubeError>;

/// Errors that can occur while talking to YouTube and related services.
#[derive(Debug, Error)]
pub enum YoutubeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Most replayed signal absent for video {0}")]
    ReplaySignalAbsent(String),

    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("Different base language codes for video {video_id}: {codes:?}")]
    InconsistentBaseLanguage { video_id: String, codes: Vec<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record: {0}")]
    Model(#[from] ModelError),
}

impl YoutubeError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Conditions that mean "this video has no such data", as opposed to a
    /// failed request.
    pub fn is_expected_absence(&self) -> bool {
        matches!(
            self,
            YoutubeError::ReplaySignalAbsent(_) | YoutubeError::TranscriptsDisabled(_)
        )
    }

    /// HTTP status for metrics, when the error came from a response.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            YoutubeError::Api { status, .. } => Some(*status),
            YoutubeError::VideoNotFound(_) | YoutubeError::ChannelNotFound(_) => Some(404),
            YoutubeError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Quota exhaustion is reported as 403 with a `quotaExceeded` reason.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, YoutubeError::Api { status: 403, message } if message.contains("quota"))
    }
}
