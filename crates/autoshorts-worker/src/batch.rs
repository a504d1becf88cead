//! Batch downloads over channels, id lists, searches and charts.
//!
//! Every entry point resolves a list of videos, applies the date window and
//! count limit, makes sure the owning channels are recorded, then runs the
//! per-video pipeline in fixed-size chunks. Downloads inside a chunk run
//! concurrently; the next chunk starts once the whole chunk has finished.
//! A failing video is logged and counted without affecting the others.

use std::collections::{BTreeSet, HashMap, HashSet};

use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

use autoshorts_models::{
    select_by_date, DateWindow, DownloadConfig, DownloadParams, VideoRecord, VideoRecordWithStats,
};
use autoshorts_youtube::{
    collect_most_popular, collect_search_ids, ChannelLister, SearchQuery, MAX_IDS_PER_REQUEST,
};

use crate::config::WorkerConfig;
use crate::context::AppContext;
use crate::error::{WorkerError, WorkerResult};
use crate::video_download::{DownloadOutcome, VideoDownloader};

/// Selection and fan-out settings for one batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub page_size: u32,
    /// Playlist items listed before filtering
    pub info_limit: usize,
    /// Videos downloaded after filtering
    pub limit: Option<usize>,
    pub window: DateWindow,
    pub chunk_size: usize,
    pub resolution: String,
}

impl BatchOptions {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            page_size: config.page_size,
            info_limit: config.info_limit,
            limit: None,
            window: DateWindow::default(),
            chunk_size: config.chunk_size,
            resolution: config.resolution.clone(),
        }
    }
}

/// Per-outcome tally of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Videos handed to the per-video pipeline
    pub selected: usize,
    pub completed: usize,
    pub already_persisted: usize,
    pub no_replay_signal: usize,
    pub skipped_short_form: usize,
    /// Ids whose pipeline returned an error
    pub failed: Vec<String>,
    pub chunks: usize,
}

impl BatchReport {
    fn record(&mut self, video_id: &str, result: WorkerResult<DownloadOutcome>) {
        match result {
            Ok(DownloadOutcome::Completed { .. }) => self.completed += 1,
            Ok(DownloadOutcome::AlreadyPersisted) => self.already_persisted += 1,
            Ok(DownloadOutcome::NoReplaySignal) => self.no_replay_signal += 1,
            Ok(DownloadOutcome::SkippedShortForm) => self.skipped_short_form += 1,
            Err(e) => {
                error!(video_id = %video_id, error = %e, "Video download failed");
                self.failed.push(video_id.to_string());
            }
        }
    }
}

/// Drives [`VideoDownloader`] over many videos.
#[derive(Clone)]
pub struct BatchDownloader {
    ctx: AppContext,
    videos: VideoDownloader,
}

impl BatchDownloader {
    pub fn new(ctx: AppContext, short_form_max_secs: Option<u64>) -> Self {
        let videos = VideoDownloader::new(ctx.clone()).with_short_form_cutoff(short_form_max_secs);
        Self { ctx, videos }
    }

    /// Download the uploads of the channel that published `seed_video_id`.
    pub async fn download_channel(
        &self,
        seed_video_id: &str,
        config: &DownloadConfig,
        options: &BatchOptions,
    ) -> WorkerResult<BatchReport> {
        config.validate()?;

        let lister = ChannelLister::new(self.ctx.api.clone());
        let listed = lister
            .list_channel_videos(seed_video_id, options.page_size, options.info_limit)
            .await?;
        info!(seed_video_id = %seed_video_id, listed = listed.len(), "Channel listed");

        let videos = self.enrich(listed).await;
        self.process(videos, config, options).await
    }

    /// Download an explicit list of video ids.
    pub async fn download_videos(
        &self,
        video_ids: &[String],
        config: &DownloadConfig,
        options: &BatchOptions,
    ) -> WorkerResult<BatchReport> {
        config.validate()?;

        let mut seen = HashSet::new();
        let video_ids: Vec<String> = video_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let videos = self.ctx.api.list_videos(&video_ids).await?;
        if videos.len() < video_ids.len() {
            warn!(
                requested = video_ids.len(),
                found = videos.len(),
                "Some video ids are unknown to the platform"
            );
        }
        self.process(videos, config, options).await
    }

    /// Download the results of a search query.
    pub async fn download_search(
        &self,
        query: &SearchQuery,
        max_results: usize,
        config: &DownloadConfig,
        options: &BatchOptions,
    ) -> WorkerResult<BatchReport> {
        config.validate()?;

        let ids = collect_search_ids(self.ctx.api.as_ref(), query, max_results).await?;
        info!(query = %query.query, found = ids.len(), "Search collected");
        self.download_videos(&ids, config, options).await
    }

    /// Download videos from the `mostPopular` chart.
    pub async fn download_most_popular(
        &self,
        region_code: &str,
        category_id: Option<&str>,
        max_results: usize,
        config: &DownloadConfig,
        options: &BatchOptions,
    ) -> WorkerResult<BatchReport> {
        config.validate()?;

        let videos =
            collect_most_popular(self.ctx.api.as_ref(), region_code, category_id, max_results)
                .await?;
        self.process(videos, config, options).await
    }

    /// Replace playlist records with full records carrying statistics and
    /// duration. A failed lookup keeps the playlist record without stats.
    async fn enrich(&self, listed: Vec<VideoRecord>) -> Vec<VideoRecordWithStats> {
        let mut videos = Vec::with_capacity(listed.len());

        for chunk in listed.chunks(MAX_IDS_PER_REQUEST) {
            let ids: Vec<String> = chunk.iter().map(|r| r.id.to_string()).collect();
            match self.ctx.api.list_videos(&ids).await {
                Ok(full) => {
                    let mut by_id: HashMap<String, VideoRecordWithStats> = full
                        .into_iter()
                        .map(|v| (v.id().to_string(), v))
                        .collect();
                    videos.extend(chunk.iter().map(|record| {
                        by_id
                            .remove(record.id.as_str())
                            .unwrap_or_else(|| VideoRecordWithStats::without_stats(record.clone()))
                    }));
                }
                Err(e) => {
                    warn!(error = %e, videos = chunk.len(), "Statistics lookup failed");
                    videos.extend(chunk.iter().cloned().map(VideoRecordWithStats::without_stats));
                }
            }
        }

        videos
    }

    async fn process(
        &self,
        videos: Vec<VideoRecordWithStats>,
        config: &DownloadConfig,
        options: &BatchOptions,
    ) -> WorkerResult<BatchReport> {
        let total = videos.len();
        // Two tasks on one id would share a local directory and object keys.
        let mut seen = HashSet::new();
        let videos: Vec<_> = videos
            .into_iter()
            .filter(|v| seen.insert(v.id().clone()))
            .collect();

        let mut selected = select_by_date(videos, &options.window);
        if let Some(limit) = options.limit {
            selected.truncate(limit);
        }
        info!(total, selected = selected.len(), "Videos selected");

        self.ensure_channels(&selected).await?;

        let mut report = BatchReport {
            selected: selected.len(),
            ..BatchReport::default()
        };

        for chunk in selected.chunks(options.chunk_size.max(1)) {
            let results = join_all(chunk.iter().map(|video| {
                let params = DownloadParams::new(config.clone(), video.clone())
                    .with_resolution(options.resolution.clone());
                async move {
                    let result = self.videos.download(&params).await;
                    (params.video.id().to_string(), result)
                }
            }))
            .await;

            for (video_id, result) in results {
                report.record(&video_id, result);
            }
            report.chunks += 1;
            info!(
                chunk = report.chunks,
                completed = report.completed,
                failed = report.failed.len(),
                "Chunk finished"
            );
        }

        Ok(report)
    }

    /// Record every channel that is not yet in the database. A failed
    /// channel lookup only costs the channel row, except for quota errors.
    async fn ensure_channels(&self, videos: &[VideoRecordWithStats]) -> WorkerResult<()> {
        let channel_ids: BTreeSet<&str> = videos
            .iter()
            .filter_map(|v| v.record.channel_id.as_deref())
            .filter(|c| !c.is_empty())
            .collect();

        for channel_id in channel_ids {
            if self.ctx.store.channel_exists(channel_id).await? {
                continue;
            }
            match self.ctx.api.get_channel(channel_id).await {
                Ok(channel) => self.ctx.store.upsert_channel(&channel).await?,
                Err(e) if e.is_quota_exceeded() => return Err(e.into()),
                Err(e) => warn!(channel_id = %channel_id, error = %e, "Channel lookup failed"),
            }
        }
        Ok(())
    }
}
