//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while downloading media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("yt-dlp not found: {0}")]
    YtDlpNotFound(String),

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("Invalid resolution '{0}', expected a value like 480p")]
    InvalidResolution(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Rate limiting is worth surfacing separately in logs.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            MediaError::DownloadFailed { message } => {
                message.contains("429")
                    || message.contains("Too Many Requests")
                    || message.contains("Sign in to confirm")
            }
            _ => false,
        }
    }
}
