//! Per-video download pipeline.
//!
//! Steps, in order:
//! 1. Validate the download config (no I/O before this passes)
//! 2. Skip short-form videos when a cutoff is configured
//! 3. Skip videos already recorded in the database
//! 4. Probe the replay heatmap; videos without one are not downloaded
//! 5. Fetch transcripts, best-effort
//! 6. Write `video_data.json`, then download `video.mp4` next to it
//! 7. Upload both and record the row, then drop the local copy if asked

use std::path::PathBuf;

use metrics::counter;
use tracing::{debug, Instrument};

use autoshorts_models::layout::{self, MEDIA_FILE, SIDECAR_FILE};
use autoshorts_models::{DownloadParams, PersistedVideoRow, TranscriptSet, VideoSidecar};
use autoshorts_youtube::YoutubeError;

use crate::context::AppContext;
use crate::error::WorkerResult;
use crate::logging::VideoLogger;

/// How a single video download ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Duration at or below the short-form cutoff.
    SkippedShortForm,
    /// A database row already exists for the video.
    AlreadyPersisted,
    /// The video has no "most replayed" heatmap.
    NoReplaySignal,
    Completed {
        /// Local directory, when it was kept.
        local_dir: Option<PathBuf>,
        /// Object storage prefix, when uploaded.
        storage_prefix: Option<String>,
        transcript_tracks: usize,
    },
}

impl DownloadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadOutcome::SkippedShortForm => "skipped_short_form",
            DownloadOutcome::AlreadyPersisted => "already_persisted",
            DownloadOutcome::NoReplaySignal => "no_replay_signal",
            DownloadOutcome::Completed { .. } => "completed",
        }
    }
}

/// Runs the pipeline for one video at a time.
#[derive(Clone)]
pub struct VideoDownloader {
    ctx: AppContext,
    short_form_max_secs: Option<u64>,
}

impl VideoDownloader {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            short_form_max_secs: None,
        }
    }

    /// Skip videos whose duration is at most `max_secs`.
    pub fn with_short_form_cutoff(mut self, max_secs: Option<u64>) -> Self {
        self.short_form_max_secs = max_secs;
        self
    }

    pub async fn download(&self, params: &DownloadParams) -> WorkerResult<DownloadOutcome> {
        params.validate()?;

        let logger = VideoLogger::new(params.video.id().as_str(), "video_download");
        let span = logger.create_span();
        let result = self.run(params, &logger).instrument(span).await;

        let outcome = match &result {
            Ok(outcome) => outcome.as_str(),
            Err(_) => "error",
        };
        counter!("video_downloads_total", "outcome" => outcome).increment(1);
        result
    }

    async fn run(
        &self,
        params: &DownloadParams,
        logger: &VideoLogger,
    ) -> WorkerResult<DownloadOutcome> {
        let config = &params.config;
        let record = &params.video.record;
        let video_id = record.id.as_str();

        if let (Some(max), Some(duration)) = (self.short_form_max_secs, record.duration_secs) {
            if duration <= max {
                debug!(video_id = %video_id, duration, "Skipping short-form video");
                return Ok(DownloadOutcome::SkippedShortForm);
            }
        }

        if self.ctx.store.video_exists(video_id).await? {
            debug!(video_id = %video_id, "Video already persisted");
            return Ok(DownloadOutcome::AlreadyPersisted);
        }

        let moments = match self.ctx.replay.probe(video_id).await {
            Ok(moments) => moments,
            Err(YoutubeError::ReplaySignalAbsent(_)) => {
                logger.log_progress("no replay heatmap, skipping");
                return Ok(DownloadOutcome::NoReplaySignal);
            }
            Err(e) => return Err(e.into()),
        };
        logger.log_start(&format!("{} replay moments", moments.len()));

        let transcripts = self.fetch_transcripts(video_id, logger).await;
        let transcript_tracks = transcripts.as_ref().map_or(0, TranscriptSet::len);

        let dir = layout::local_video_dir(&config.save_path, record);
        tokio::fs::create_dir_all(&dir).await?;

        let sidecar_path = dir.join(SIDECAR_FILE);
        let sidecar = VideoSidecar {
            video: params.video.clone(),
            moments,
            transcripts,
        };
        tokio::fs::write(&sidecar_path, serde_json::to_vec_pretty(&sidecar)?).await?;

        let media_path = dir.join(MEDIA_FILE);
        self.ctx
            .media
            .download(video_id, &params.resolution, &media_path)
            .await?;
        logger.log_progress("media downloaded");

        let mut storage_prefix = None;
        if config.upload {
            let prefix = layout::storage_prefix(record);
            self.ctx
                .storage
                .upload_file(
                    &config.bucket,
                    &sidecar_path,
                    &layout::storage_key(&prefix, SIDECAR_FILE),
                )
                .await?;
            self.ctx
                .storage
                .upload_file(
                    &config.bucket,
                    &media_path,
                    &layout::storage_key(&prefix, MEDIA_FILE),
                )
                .await?;

            let row = PersistedVideoRow::from_record(&params.video, prefix.clone());
            if !self.ctx.store.insert_video_if_absent(&row).await? {
                logger.log_warning("row written concurrently by another run");
            }

            if !config.keep_local {
                tokio::fs::remove_dir_all(&dir).await?;
            }
            storage_prefix = Some(prefix);
        }

        logger.log_completion(&format!(
            "uploaded={} kept_local={}",
            storage_prefix.is_some(),
            config.keep_local
        ));
        Ok(DownloadOutcome::Completed {
            local_dir: config.keep_local.then_some(dir),
            storage_prefix,
            transcript_tracks,
        })
    }

    async fn fetch_transcripts(&self, video_id: &str, logger: &VideoLogger) -> Option<TranscriptSet> {
        match self.ctx.transcripts.fetch_transcripts(video_id).await {
            Ok(set) => Some(set),
            Err(e) if e.is_expected_absence() => {
                debug!(video_id = %video_id, "No transcripts available");
                None
            }
            Err(e) => {
                logger.log_warning(&format!("transcript fetch failed: {e}"));
                None
            }
        }
    }
}
