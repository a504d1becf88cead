//! YouTube Data API v3 client.
//!
//! Thin wrapper over the REST endpoints the harvester consumes:
//! - `videos.list` (by id batch, and the `mostPopular` chart)
//! - `playlistItems.list`
//! - `search.list`
//! - `channels.list`
//! - `videoCategories.list`
//!
//! Responses are normalized through [`autoshorts_models::normalize`]. No
//! retries are attempted here; errors propagate to the caller.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info_span, Instrument};

use autoshorts_models::json_path::get_string;
use autoshorts_models::normalize;
use autoshorts_models::{ChannelRecord, PlaylistPage, VideoCategory, VideoRecordWithStats};

use crate::config::YoutubeConfig;
use crate::error::{YoutubeError, YoutubeResult};
use crate::metrics::record_request;

/// Upper bound on ids per `videos.list` call and on page sizes.
pub const MAX_IDS_PER_REQUEST: usize = 50;

/// Keeps the key out of request URLs, which reqwest errors print.
const API_KEY_HEADER: &str = "x-goog-api-key";
const VIDEO_PARTS: &str = "contentDetails,snippet,statistics";
const PLAYLIST_PARTS: &str = "contentDetails,snippet";
const CHANNEL_PARTS: &str = "snippet,contentDetails,statistics";

/// Ordering accepted by `search.list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchOrder {
    Date,
    Rating,
    #[default]
    Relevance,
    Title,
    ViewCount,
}

impl SearchOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Date => "date",
            SearchOrder::Rating => "rating",
            SearchOrder::Relevance => "relevance",
            SearchOrder::Title => "title",
            SearchOrder::ViewCount => "viewCount",
        }
    }
}

impl fmt::Display for SearchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchOrder {
    type Err = YoutubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(SearchOrder::Date),
            "rating" => Ok(SearchOrder::Rating),
            "relevance" => Ok(SearchOrder::Relevance),
            "title" => Ok(SearchOrder::Title),
            "viewcount" | "view_count" | "views" => Ok(SearchOrder::ViewCount),
            other => Err(YoutubeError::config_error(format!(
                "unknown search order '{other}'"
            ))),
        }
    }
}

/// Parameters of a `search.list` query.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: String,
    pub order: SearchOrder,
    pub region_code: Option<String>,
    /// RFC 3339 lower bound on publication time.
    pub published_after: Option<String>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// One page of full video records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoPage {
    pub items: Vec<VideoRecordWithStats>,
    pub next_page_token: Option<String>,
}

/// Operations consumed from the video platform.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Categories available in a region.
    async fn list_categories(&self, region_code: &str) -> YoutubeResult<Vec<VideoCategory>>;

    /// Full records for the given ids. Ids unknown to the platform are
    /// silently missing from the result.
    async fn list_videos(&self, ids: &[String]) -> YoutubeResult<Vec<VideoRecordWithStats>>;

    /// One page of a playlist.
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> YoutubeResult<PlaylistPage>;

    /// One page of video search results.
    async fn search_page(
        &self,
        query: &SearchQuery,
        page_size: u32,
        page_token: Option<&str>,
    ) -> YoutubeResult<SearchPage>;

    async fn get_channel(&self, channel_id: &str) -> YoutubeResult<ChannelRecord>;

    /// One page of the `mostPopular` chart.
    async fn most_popular_page(
        &self,
        region_code: &str,
        category_id: Option<&str>,
        page_size: u32,
        page_token: Option<&str>,
    ) -> YoutubeResult<VideoPage>;
}

fn clamp_page_size(page_size: u32) -> String {
    page_size.clamp(1, MAX_IDS_PER_REQUEST as u32).to_string()
}

fn next_page_token(response: &Value) -> Option<String> {
    get_string(response, &["nextPageToken"]).filter(|t| !t.is_empty())
}

/// REST client for the Data API.
#[derive(Clone)]
pub struct YoutubeDataClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl YoutubeDataClient {
    pub fn new(config: &YoutubeConfig) -> YoutubeResult<Self> {
        Ok(Self::with_http(config.http_client()?, config))
    }

    /// Build on top of an existing HTTP client.
    pub fn with_http(http: Client, config: &YoutubeConfig) -> Self {
        Self {
            http,
            base_url: config.data_api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn get_json(
        &self,
        operation: &'static str,
        resource: &str,
        params: &[(&str, String)],
    ) -> YoutubeResult<Value> {
        let url = format!("{}/{}", self.base_url, resource);
        let span = info_span!("youtube_api_request", operation = %operation);

        let start = Instant::now();
        let result = self.send(&url, params).instrument(span).await;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request("data_api", operation, status, start.elapsed().as_millis() as f64);

        result
    }

    async fn send(&self, url: &str, params: &[(&str, String)]) -> YoutubeResult<Value> {
        let response = self
            .http
            .get(url)
            .query(params)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| YoutubeError::Network(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| get_string(&v, &["error", "message"]))
                .unwrap_or(body);
            return Err(YoutubeError::api(status.as_u16(), message));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| YoutubeError::Network(e.without_url()))?;
        debug!(url = %url, "Data API request succeeded");
        Ok(value)
    }
}

#[async_trait]
impl PlatformApi for YoutubeDataClient {
    async fn list_categories(&self, region_code: &str) -> YoutubeResult<Vec<VideoCategory>> {
        let response = self
            .get_json(
                "list_categories",
                "videoCategories",
                &[
                    ("part", "snippet".to_string()),
                    ("regionCode", region_code.to_string()),
                ],
            )
            .await?;

        normalize::response_items(&response)
            .iter()
            .map(|item| normalize::video_category(item, region_code).map_err(Into::into))
            .collect()
    }

    async fn list_videos(&self, ids: &[String]) -> YoutubeResult<Vec<VideoRecordWithStats>> {
        let mut videos = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            let response = self
                .get_json(
                    "list_videos",
                    "videos",
                    &[
                        ("part", VIDEO_PARTS.to_string()),
                        ("id", chunk.join(",")),
                        ("maxResults", MAX_IDS_PER_REQUEST.to_string()),
                    ],
                )
                .await?;

            for item in normalize::response_items(&response) {
                videos.push(normalize::video_record_with_stats(item)?);
            }
        }
        Ok(videos)
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> YoutubeResult<PlaylistPage> {
        let mut params = vec![
            ("part", PLAYLIST_PARTS.to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", clamp_page_size(page_size)),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let response = self
            .get_json("list_playlist_items", "playlistItems", &params)
            .await?;
        Ok(normalize::playlist_page(&response)?)
    }

    async fn search_page(
        &self,
        query: &SearchQuery,
        page_size: u32,
        page_token: Option<&str>,
    ) -> YoutubeResult<SearchPage> {
        let mut params = vec![
            ("part", "id".to_string()),
            ("type", "video".to_string()),
            ("q", query.query.clone()),
            ("order", query.order.as_str().to_string()),
            ("maxResults", clamp_page_size(page_size)),
        ];
        if let Some(region) = &query.region_code {
            params.push(("regionCode", region.clone()));
        }
        if let Some(after) = &query.published_after {
            params.push(("publishedAfter", after.clone()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let response = self.get_json("search", "search", &params).await?;
        let video_ids = normalize::response_items(&response)
            .iter()
            .filter_map(|item| get_string(item, &["id", "videoId"]))
            .collect();

        Ok(SearchPage {
            video_ids,
            next_page_token: next_page_token(&response),
        })
    }

    async fn get_channel(&self, channel_id: &str) -> YoutubeResult<ChannelRecord> {
        let response = self
            .get_json(
                "get_channel",
                "channels",
                &[
                    ("part", CHANNEL_PARTS.to_string()),
                    ("id", channel_id.to_string()),
                ],
            )
            .await?;

        let item = normalize::response_items(&response)
            .first()
            .ok_or_else(|| YoutubeError::ChannelNotFound(channel_id.to_string()))?;
        Ok(normalize::channel_record(item)?)
    }

    async fn most_popular_page(
        &self,
        region_code: &str,
        category_id: Option<&str>,
        page_size: u32,
        page_token: Option<&str>,
    ) -> YoutubeResult<VideoPage> {
        let mut params = vec![
            ("part", VIDEO_PARTS.to_string()),
            ("chart", "mostPopular".to_string()),
            ("regionCode", region_code.to_string()),
            ("maxResults", clamp_page_size(page_size)),
        ];
        if let Some(category) = category_id {
            params.push(("videoCategoryId", category.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let response = self.get_json("most_popular", "videos", &params).await?;
        let items = normalize::response_items(&response)
            .iter()
            .map(normalize::video_record_with_stats)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VideoPage {
            items,
            next_page_token: next_page_token(&response),
        })
    }
}
