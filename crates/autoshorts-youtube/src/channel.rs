//! Paginated listing of a channel's uploads.

use std::sync::Arc;

use tracing::{debug, info};

use autoshorts_models::{uploads_playlist_id, VideoRecord};

use crate::client::PlatformApi;
use crate::error::{YoutubeError, YoutubeResult};

/// Walks a channel's uploads playlist starting from one of its videos.
#[derive(Clone)]
pub struct ChannelLister {
    api: Arc<dyn PlatformApi>,
}

impl ChannelLister {
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self { api }
    }

    /// Channel id owning `video_id`.
    pub async fn channel_id_for_video(&self, video_id: &str) -> YoutubeResult<String> {
        let videos = self.api.list_videos(&[video_id.to_string()]).await?;
        let video = videos
            .into_iter()
            .next()
            .ok_or_else(|| YoutubeError::VideoNotFound(video_id.to_string()))?;
        video.record.channel_id.ok_or_else(|| {
            YoutubeError::invalid_response(format!("video {video_id} has no channel id"))
        })
    }

    /// List up to `limit` uploads of the channel owning `seed_video_id`, in
    /// playlist order.
    pub async fn list_channel_videos(
        &self,
        seed_video_id: &str,
        page_size: u32,
        limit: usize,
    ) -> YoutubeResult<Vec<VideoRecord>> {
        let channel_id = self.channel_id_for_video(seed_video_id).await?;
        let playlist_id = uploads_playlist_id(&channel_id);
        info!(
            seed_video_id = %seed_video_id,
            channel_id = %channel_id,
            playlist_id = %playlist_id,
            "Listing channel uploads"
        );
        self.list_playlist(&playlist_id, page_size, limit).await
    }

    /// List up to `limit` items of a playlist, following continuation tokens
    /// until the platform stops returning one.
    pub async fn list_playlist(
        &self,
        playlist_id: &str,
        page_size: u32,
        limit: usize,
    ) -> YoutubeResult<Vec<VideoRecord>> {
        let mut videos = Vec::new();
        if limit == 0 {
            return Ok(videos);
        }

        let mut token: Option<String> = None;
        loop {
            let page = self
                .api
                .list_playlist_items(playlist_id, page_size, token.as_deref())
                .await?;
            videos.extend(page.items);
            debug!(playlist_id = %playlist_id, collected = videos.len(), "Fetched playlist page");

            match page.next_page_token {
                Some(next) if videos.len() < limit => token = Some(next),
                _ => break,
            }
        }

        videos.truncate(limit);
        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePlatform;
    use autoshorts_models::{PlaylistPage, VideoRecordWithStats};

    fn seed() -> VideoRecordWithStats {
        let mut record = VideoRecord::new("seed0000001");
        record.channel_id = Some("UCchannel".into());
        record.into()
    }

    fn page(ids: &[&str], next: Option<&str>) -> PlaylistPage {
        PlaylistPage {
            items: ids.iter().map(|id| VideoRecord::new(*id)).collect(),
            next_page_token: next.map(str::to_owned),
        }
    }

    fn ids(videos: &[VideoRecord]) -> Vec<&str> {
        videos.iter().map(|v| v.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_walks_all_pages_of_uploads_playlist() {
        let api = Arc::new(
            FakePlatform::default()
                .with_video(seed())
                .with_playlist_page(None, page(&["a", "b"], Some("t2")))
                .with_playlist_page(Some("t2"), page(&["c", "d"], Some("t3")))
                .with_playlist_page(Some("t3"), page(&["e"], None)),
        );
        let lister = ChannelLister::new(api.clone());

        let videos = lister.list_channel_videos("seed0000001", 2, 100).await.unwrap();
        assert_eq!(ids(&videos), vec!["a", "b", "c", "d", "e"]);

        let requests = api.playlist_requests();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|(playlist, size, _)| playlist == "UUchannel" && *size == 2));
        assert_eq!(requests[1].2.as_deref(), Some("t2"));
        assert_eq!(requests[2].2.as_deref(), Some("t3"));
    }

    #[tokio::test]
    async fn test_stops_at_limit_and_truncates() {
        let api = Arc::new(
            FakePlatform::default()
                .with_playlist_page(None, page(&["a", "b"], Some("t2")))
                .with_playlist_page(Some("t2"), page(&["c", "d"], Some("t3"))),
        );
        let lister = ChannelLister::new(api.clone());

        let videos = lister.list_playlist("UUx", 2, 3).await.unwrap();
        assert_eq!(ids(&videos), vec!["a", "b", "c"]);
        assert_eq!(api.playlist_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_token_ends_pagination() {
        let api = Arc::new(FakePlatform::default().with_playlist_page(None, page(&["a"], None)));
        let lister = ChannelLister::new(api.clone());

        let videos = lister.list_playlist("UUx", 50, 100).await.unwrap();
        assert_eq!(ids(&videos), vec!["a"]);
        assert_eq!(api.playlist_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_limit_makes_no_calls() {
        let api = Arc::new(FakePlatform::default());
        let lister = ChannelLister::new(api.clone());

        assert!(lister.list_playlist("UUx", 50, 0).await.unwrap().is_empty());
        assert!(api.playlist_requests().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let api = Arc::new(
            FakePlatform::default().with_playlist_page(None, page(&["a"], Some("missing"))),
        );
        let lister = ChannelLister::new(api);

        let err = lister.list_playlist("UUx", 1, 10).await.unwrap_err();
        assert!(matches!(err, YoutubeError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unknown_seed_video() {
        let lister = ChannelLister::new(Arc::new(FakePlatform::default()));
        let err = lister.list_channel_videos("nope", 50, 10).await.unwrap_err();
        assert!(matches!(err, YoutubeError::VideoNotFound(_)));
    }
}
