//! In-memory platform double shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use autoshorts_models::{ChannelRecord, PlaylistPage, VideoCategory, VideoRecordWithStats};

use crate::client::{PlatformApi, SearchPage, SearchQuery, VideoPage};
use crate::error::{YoutubeError, YoutubeResult};

#[derive(Default)]
pub struct FakePlatform {
    videos: HashMap<String, VideoRecordWithStats>,
    /// Playlist pages keyed by the token that requests them.
    playlist_pages: HashMap<Option<String>, PlaylistPage>,
    search_pages: Mutex<VecDeque<SearchPage>>,
    popular_pages: Mutex<VecDeque<VideoPage>>,
    playlist_requests: Mutex<Vec<(String, u32, Option<String>)>>,
    search_calls: AtomicUsize,
}

impl FakePlatform {
    pub fn with_video(mut self, video: VideoRecordWithStats) -> Self {
        self.videos.insert(video.id().to_string(), video);
        self
    }

    pub fn with_playlist_page(mut self, token: Option<&str>, page: PlaylistPage) -> Self {
        self.playlist_pages.insert(token.map(str::to_owned), page);
        self
    }

    pub fn with_search_pages(self, pages: Vec<SearchPage>) -> Self {
        *self.search_pages.lock().unwrap() = pages.into();
        self
    }

    pub fn with_popular_pages(self, pages: Vec<VideoPage>) -> Self {
        *self.popular_pages.lock().unwrap() = pages.into();
        self
    }

    pub fn playlist_requests(&self) -> Vec<(String, u32, Option<String>)> {
        self.playlist_requests.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn list_categories(&self, _region_code: &str) -> YoutubeResult<Vec<VideoCategory>> {
        Ok(Vec::new())
    }

    async fn list_videos(&self, ids: &[String]) -> YoutubeResult<Vec<VideoRecordWithStats>> {
        Ok(ids.iter().filter_map(|id| self.videos.get(id).cloned()).collect())
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> YoutubeResult<PlaylistPage> {
        self.playlist_requests.lock().unwrap().push((
            playlist_id.to_string(),
            page_size,
            page_token.map(str::to_owned),
        ));
        self.playlist_pages
            .get(&page_token.map(str::to_owned))
            .cloned()
            .ok_or_else(|| YoutubeError::api(404, format!("playlist {playlist_id} not found")))
    }

    async fn search_page(
        &self,
        _query: &SearchQuery,
        _page_size: u32,
        _page_token: Option<&str>,
    ) -> YoutubeResult<SearchPage> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.search_pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn get_channel(&self, channel_id: &str) -> YoutubeResult<ChannelRecord> {
        Err(YoutubeError::ChannelNotFound(channel_id.to_string()))
    }

    async fn most_popular_page(
        &self,
        _region_code: &str,
        _category_id: Option<&str>,
        _page_size: u32,
        _page_token: Option<&str>,
    ) -> YoutubeResult<VideoPage> {
        Ok(self.popular_pages.lock().unwrap().pop_front().unwrap_or_default())
    }
}
