//! In-memory collaborators with call counters for orchestrator tests.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use autoshorts_db::{DbResult, VideoStore};
use autoshorts_media::{MediaDownloader, MediaError, MediaResult};
use autoshorts_models::{
    ChannelRecord, DatasetFilter, PersistedVideoRow, PlaylistPage, ReplayMoment, TranscriptItem,
    TranscriptSet, TranscriptTrack, VideoCategory, VideoRecord, VideoRecordWithStats,
    VideoStatistics,
};
use autoshorts_storage::{ObjectStore, StorageError, StorageResult};
use autoshorts_youtube::{
    PlatformApi, ReplayProbe, SearchPage, SearchQuery, TranscriptSource, VideoPage, YoutubeError,
    YoutubeResult,
};

use crate::context::AppContext;

pub fn video(id: &str, channel_id: &str, published_at: &str) -> VideoRecordWithStats {
    let mut record = VideoRecord::new(id);
    record.channel_id = Some(channel_id.to_string());
    record.category_id = "22".to_string();
    record.published_at = Some(published_at.to_string());
    record.duration_secs = Some(600);
    VideoRecordWithStats {
        record,
        statistics: Some(VideoStatistics {
            comments: Some(1),
            likes: Some(2),
            views: Some(3),
        }),
    }
}

#[derive(Default)]
pub struct FakeApi {
    pub videos: Mutex<HashMap<String, VideoRecordWithStats>>,
    /// Playlist pages keyed by the token that requests them.
    pub playlist: Mutex<HashMap<Option<String>, PlaylistPage>>,
    pub search: Mutex<HashMap<Option<String>, SearchPage>>,
    pub categories: Mutex<Vec<VideoCategory>>,
    pub fail_list_videos: Mutex<bool>,
    pub list_videos_calls: Mutex<Vec<Vec<String>>>,
    pub get_channel_calls: AtomicUsize,
}

impl FakeApi {
    pub fn with_videos(videos: &[VideoRecordWithStats]) -> Self {
        let api = Self::default();
        {
            let mut map = api.videos.lock().unwrap();
            for v in videos {
                map.insert(v.id().to_string(), v.clone());
            }
        }
        api
    }
}

#[async_trait]
impl PlatformApi for FakeApi {
    async fn list_categories(&self, region_code: &str) -> YoutubeResult<Vec<VideoCategory>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.region_code == region_code)
            .cloned()
            .collect())
    }

    async fn list_videos(&self, ids: &[String]) -> YoutubeResult<Vec<VideoRecordWithStats>> {
        self.list_videos_calls.lock().unwrap().push(ids.to_vec());
        if *self.fail_list_videos.lock().unwrap() {
            return Err(YoutubeError::api(500, "backend error"));
        }
        let videos = self.videos.lock().unwrap();
        Ok(ids.iter().filter_map(|id| videos.get(id).cloned()).collect())
    }

    async fn list_playlist_items(
        &self,
        _playlist_id: &str,
        _page_size: u32,
        page_token: Option<&str>,
    ) -> YoutubeResult<PlaylistPage> {
        Ok(self
            .playlist
            .lock()
            .unwrap()
            .get(&page_token.map(str::to_string))
            .cloned()
            .unwrap_or_default())
    }

    async fn search_page(
        &self,
        _query: &SearchQuery,
        _page_size: u32,
        page_token: Option<&str>,
    ) -> YoutubeResult<SearchPage> {
        Ok(self
            .search
            .lock()
            .unwrap()
            .get(&page_token.map(str::to_string))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_channel(&self, channel_id: &str) -> YoutubeResult<ChannelRecord> {
        self.get_channel_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ChannelRecord {
            channel_id: channel_id.to_string(),
            title: Some(format!("Channel {channel_id}")),
            description: None,
            custom_url: None,
            views: Some(100),
            subscribers: Some(10),
        })
    }

    async fn most_popular_page(
        &self,
        _region_code: &str,
        _category_id: Option<&str>,
        _page_size: u32,
        _page_token: Option<&str>,
    ) -> YoutubeResult<VideoPage> {
        Ok(VideoPage {
            items: self.videos.lock().unwrap().values().cloned().collect(),
            next_page_token: None,
        })
    }
}

/// Every video has a heatmap unless listed in `absent` or `failing`.
#[derive(Default)]
pub struct FakeReplay {
    pub absent: Mutex<HashSet<String>>,
    pub failing: Mutex<HashSet<String>>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl ReplayProbe for FakeReplay {
    async fn probe(&self, video_id: &str) -> YoutubeResult<Vec<ReplayMoment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(video_id) {
            return Err(YoutubeError::api(500, "replay backend down"));
        }
        if self.absent.lock().unwrap().contains(video_id) {
            return Err(YoutubeError::ReplaySignalAbsent(video_id.to_string()));
        }
        Ok(vec![
            ReplayMoment::new(0, 5000, 1.0),
            ReplayMoment::new(5000, 5000, 0.25),
        ])
    }
}

/// Returns one English track unless the video is listed in `disabled`.
#[derive(Default)]
pub struct FakeTranscripts {
    pub disabled: Mutex<HashSet<String>>,
    pub calls: AtomicUsize,
}

#[async_trait]
impl TranscriptSource for FakeTranscripts {
    async fn fetch_transcripts(&self, video_id: &str) -> YoutubeResult<TranscriptSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.disabled.lock().unwrap().contains(video_id) {
            return Err(YoutubeError::TranscriptsDisabled(video_id.to_string()));
        }
        let mut set = TranscriptSet::new();
        set.insert(TranscriptTrack {
            language_code: "en".into(),
            language: "English".into(),
            is_generated: true,
            is_translatable: false,
            translation_languages: Vec::new(),
            items: vec![TranscriptItem::new(0.0, 1.5, "hello")],
        });
        Ok(set)
    }
}

/// Writes a placeholder file and tracks how many downloads overlap.
#[derive(Default)]
pub struct FakeMedia {
    pub failing: Mutex<HashSet<String>>,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    /// `start:{id}` and `end:{id}` in the order they happened.
    pub events: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaDownloader for FakeMedia {
    async fn download(
        &self,
        video_id: &str,
        _resolution: &str,
        output_path: &Path,
    ) -> MediaResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.events.lock().unwrap().push(format!("start:{video_id}"));

        tokio::task::yield_now().await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(format!("end:{video_id}"));

        if self.failing.lock().unwrap().contains(video_id) {
            return Err(MediaError::download_failed("yt-dlp failed: HTTP Error 403"));
        }
        tokio::fs::write(output_path, b"mp4").await?;
        Ok(())
    }
}

/// Keys uploaded per bucket; downloads succeed for uploaded or seeded keys.
#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<HashSet<(String, String)>>,
    pub uploads: Mutex<Vec<String>>,
    pub downloads: AtomicUsize,
}

impl FakeStorage {
    pub fn seed(&self, bucket: &str, key: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()));
    }
}

#[async_trait]
impl ObjectStore for FakeStorage {
    async fn upload_file(&self, bucket: &str, path: &Path, key: &str) -> StorageResult<()> {
        if !path.exists() {
            return Err(StorageError::upload_failed(format!("{} missing", path.display())));
        }
        self.seed(bucket, key);
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn download_file(&self, bucket: &str, key: &str, path: &Path) -> StorageResult<()> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if !self
            .objects
            .lock()
            .unwrap()
            .contains(&(bucket.to_string(), key.to_string()))
        {
            return Err(StorageError::not_found(key));
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, key.as_bytes()).await?;
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .contains(&(bucket.to_string(), key.to_string())))
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub channels: Mutex<HashMap<String, ChannelRecord>>,
    pub videos: Mutex<HashMap<String, PersistedVideoRow>>,
    pub categories: Mutex<Vec<VideoCategory>>,
    pub video_exists_calls: AtomicUsize,
    pub upsert_channel_calls: AtomicUsize,
}

#[async_trait]
impl VideoStore for FakeStore {
    async fn channel_exists(&self, channel_id: &str) -> DbResult<bool> {
        Ok(self.channels.lock().unwrap().contains_key(channel_id))
    }

    async fn upsert_channel(&self, channel: &ChannelRecord) -> DbResult<()> {
        self.upsert_channel_calls.fetch_add(1, Ordering::SeqCst);
        self.channels
            .lock()
            .unwrap()
            .insert(channel.channel_id.clone(), channel.clone());
        Ok(())
    }

    async fn video_exists(&self, video_id: &str) -> DbResult<bool> {
        self.video_exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.videos.lock().unwrap().contains_key(video_id))
    }

    async fn insert_video_if_absent(&self, row: &PersistedVideoRow) -> DbResult<bool> {
        let mut videos = self.videos.lock().unwrap();
        if videos.contains_key(&row.id) {
            return Ok(false);
        }
        videos.insert(row.id.clone(), row.clone());
        Ok(true)
    }

    async fn upsert_categories(&self, categories: &[VideoCategory]) -> DbResult<u64> {
        let mut stored = self.categories.lock().unwrap();
        for category in categories {
            stored.retain(|c| {
                !(c.region_code == category.region_code && c.category_id == category.category_id)
            });
            stored.push(category.clone());
        }
        Ok(categories.len() as u64)
    }

    async fn storage_paths(&self, filter: &DatasetFilter) -> DbResult<Vec<String>> {
        let videos = self.videos.lock().unwrap();
        let mut rows: Vec<_> = videos
            .values()
            .filter(|row| {
                filter
                    .channel_id
                    .as_ref()
                    .map_or(true, |c| row.channel_id.as_ref() == Some(c))
                    && filter.category_id.as_ref().map_or(true, |c| &row.category_id == c)
            })
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|row| row.storage_path.clone())
            .collect())
    }

    async fn storage_paths_excluding(&self, video_ids: &[String]) -> DbResult<Vec<String>> {
        let videos = self.videos.lock().unwrap();
        let mut rows: Vec<_> = videos
            .values()
            .filter(|row| !video_ids.contains(&row.id))
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows.into_iter().map(|row| row.storage_path.clone()).collect())
    }
}

/// Concrete handles to the fakes behind an [`AppContext`].
pub struct Fakes {
    pub api: Arc<FakeApi>,
    pub replay: Arc<FakeReplay>,
    pub transcripts: Arc<FakeTranscripts>,
    pub media: Arc<FakeMedia>,
    pub storage: Arc<FakeStorage>,
    pub store: Arc<FakeStore>,
}

impl Fakes {
    pub fn new(api: FakeApi) -> Self {
        Self {
            api: Arc::new(api),
            replay: Arc::default(),
            transcripts: Arc::default(),
            media: Arc::default(),
            storage: Arc::default(),
            store: Arc::default(),
        }
    }

    pub fn context(&self) -> AppContext {
        AppContext {
            api: self.api.clone(),
            replay: self.replay.clone(),
            transcripts: self.transcripts.clone(),
            media: self.media.clone(),
            storage: self.storage.clone(),
            store: self.store.clone(),
        }
    }

    /// Total calls made to any collaborator that performs I/O per video.
    pub fn per_video_calls(&self) -> usize {
        self.store.video_exists_calls.load(Ordering::SeqCst)
            + self.replay.calls.load(Ordering::SeqCst)
            + self.transcripts.calls.load(Ordering::SeqCst)
            + self.media.calls.load(Ordering::SeqCst)
            + self.storage.uploads.lock().unwrap().len()
    }
}
