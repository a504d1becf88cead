//! Download configuration and the JSON sidecar written next to each video.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ModelError, ModelResult};
use crate::moments::ReplayMoment;
use crate::transcript::TranscriptSet;
use crate::video::VideoRecordWithStats;

/// Target resolution used when the caller does not pick one.
pub const DEFAULT_RESOLUTION: &str = "480p";

/// Where downloaded artifacts go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Local root directory for sidecars and media.
    pub save_path: PathBuf,
    /// Object storage bucket.
    pub bucket: String,
    /// Upload artifacts to object storage and record them in the database.
    pub upload: bool,
    /// Keep the local copy after a successful upload.
    pub keep_local: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("data"),
            bucket: "auto-shorts".to_string(),
            upload: false,
            keep_local: true,
        }
    }
}

impl DownloadConfig {
    /// At least one durable copy must survive the download.
    pub fn validate(&self) -> ModelResult<()> {
        if !self.upload && !self.keep_local {
            return Err(ModelError::invalid_config(
                "at least one of upload or keep_local must be enabled",
            ));
        }
        if self.upload && self.bucket.trim().is_empty() {
            return Err(ModelError::invalid_config("bucket is required when upload is enabled"));
        }
        Ok(())
    }
}

/// Everything needed to download one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadParams {
    pub config: DownloadConfig,
    pub video: VideoRecordWithStats,
    pub resolution: String,
}

impl DownloadParams {
    pub fn new(config: DownloadConfig, video: VideoRecordWithStats) -> Self {
        Self {
            config,
            video,
            resolution: DEFAULT_RESOLUTION.to_string(),
        }
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = resolution.into();
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        self.config.validate()
    }
}

/// Content of `video_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSidecar {
    pub video: VideoRecordWithStats,
    pub moments: Vec<ReplayMoment>,
    /// `None` when the video has no transcripts available.
    pub transcripts: Option<TranscriptSet>,
}
