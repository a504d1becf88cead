//! Raw Data API payloads to typed records.
//!
//! All field access goes through [`crate::json_path`]; a missing optional
//! field becomes `None`. The only hard requirement is the item id.

use serde_json::Value;

use crate::category::VideoCategory;
use crate::channel::{ChannelRecord, PlaylistPage};
use crate::error::{ModelError, ModelResult};
use crate::json_path::{get_bool, get_count, get_string, get_string_list, safe_get};
use crate::video::{
    parse_iso8601_duration, VideoRecord, VideoRecordWithStats, VideoStatistics, UNCATEGORIZED,
};

/// Fields shared by `videos.list` and `playlistItems.list` items.
fn record_with_id(item: &Value, id: String) -> VideoRecord {
    VideoRecord {
        id: id.into(),
        channel_id: get_string(item, &["snippet", "channelId"]),
        channel_title: get_string(item, &["snippet", "channelTitle"]),
        audio_language: get_string(item, &["snippet", "defaultAudioLanguage"]),
        licensed: get_bool(item, &["contentDetails", "licensedContent"]),
        description: get_string(item, &["snippet", "description"]),
        published_at: get_string(item, &["snippet", "publishedAt"]),
        category_id: get_string(item, &["snippet", "categoryId"])
            .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        tags: get_string_list(item, &["snippet", "tags"]),
        title: get_string(item, &["snippet", "title"]),
        duration_secs: get_string(item, &["contentDetails", "duration"])
            .as_deref()
            .and_then(parse_iso8601_duration),
    }
}

/// Normalize one `videos.list` item.
pub fn video_record(item: &Value) -> ModelResult<VideoRecord> {
    let id = get_string(item, &["id"]).ok_or(ModelError::MissingField("id"))?;
    Ok(record_with_id(item, id))
}

/// Counters from an item's `statistics` object, when present.
pub fn video_statistics(item: &Value) -> Option<VideoStatistics> {
    let stats = safe_get(item, &["statistics"]).filter(|s| s.is_object())?;
    Some(VideoStatistics {
        comments: get_count(stats, &["commentCount"]),
        likes: get_count(stats, &["likeCount"]),
        views: get_count(stats, &["viewCount"]),
    })
}

/// Normalize one `videos.list` item requested with the `statistics` part.
pub fn video_record_with_stats(item: &Value) -> ModelResult<VideoRecordWithStats> {
    Ok(VideoRecordWithStats {
        record: video_record(item)?,
        statistics: video_statistics(item),
    })
}

/// Normalize one `playlistItems.list` item; the video id lives under
/// `contentDetails.videoId`.
pub fn playlist_item(item: &Value) -> ModelResult<VideoRecord> {
    let id = get_string(item, &["contentDetails", "videoId"])
        .or_else(|| get_string(item, &["snippet", "resourceId", "videoId"]))
        .ok_or(ModelError::MissingField("contentDetails.videoId"))?;
    let mut record = record_with_id(item, id);
    // Playlist items report the playlist owner; prefer the uploader.
    if let Some(owner) = get_string(item, &["snippet", "videoOwnerChannelId"]) {
        record.channel_id = Some(owner);
    }
    if let Some(owner) = get_string(item, &["snippet", "videoOwnerChannelTitle"]) {
        record.channel_title = Some(owner);
    }
    Ok(record)
}

/// Normalize one `playlistItems.list` response.
///
/// A missing `items` array yields an empty page; a missing
/// `nextPageToken` marks the last page.
pub fn playlist_page(response: &Value) -> ModelResult<PlaylistPage> {
    let items = response_items(response)
        .iter()
        .map(playlist_item)
        .collect::<ModelResult<Vec<_>>>()?;
    Ok(PlaylistPage {
        items,
        next_page_token: get_string(response, &["nextPageToken"]).filter(|t| !t.is_empty()),
    })
}

/// Normalize one `channels.list` item.
pub fn channel_record(item: &Value) -> ModelResult<ChannelRecord> {
    let channel_id = get_string(item, &["id"]).ok_or(ModelError::MissingField("id"))?;
    Ok(ChannelRecord {
        channel_id,
        title: get_string(item, &["snippet", "title"]),
        description: get_string(item, &["snippet", "description"]),
        custom_url: get_string(item, &["snippet", "customUrl"]),
        views: get_count(item, &["statistics", "viewCount"]),
        subscribers: get_count(item, &["statistics", "subscriberCount"]),
    })
}

/// Normalize one `videoCategories.list` item for `region_code`.
pub fn video_category(item: &Value, region_code: &str) -> ModelResult<VideoCategory> {
    let category_id = get_string(item, &["id"]).ok_or(ModelError::MissingField("id"))?;
    Ok(VideoCategory {
        region_code: region_code.to_string(),
        category_id,
        category_title: get_string(item, &["snippet", "title"]),
        assignable: get_bool(item, &["snippet", "assignable"]),
    })
}

/// The `items` array of a list response, or an empty slice.
pub fn response_items(response: &Value) -> &[Value] {
    safe_get(response, &["items"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_video() -> Value {
        json!({
            "id": "dQw4w9WgXcQ",
            "snippet": {
                "channelId": "UCuAXFkgsw1L7xaCfnd5JJOw",
                "channelTitle": "Rick Astley",
                "defaultAudioLanguage": "en",
                "description": "Official video",
                "publishedAt": "2009-10-25T06:57:33Z",
                "categoryId": "10",
                "tags": ["rick", "astley"],
                "title": "Never Gonna Give You Up"
            },
            "contentDetails": {"licensedContent": true, "duration": "PT3M33S"},
            "statistics": {"viewCount": "1500000000", "likeCount": "17000000"}
        })
    }

    #[test]
    fn test_full_video_record() {
        let video = video_record_with_stats(&full_video()).unwrap();
        let record = &video.record;
        assert_eq!(record.id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(record.channel_id.as_deref(), Some("UCuAXFkgsw1L7xaCfnd5JJOw"));
        assert_eq!(record.audio_language.as_deref(), Some("en"));
        assert_eq!(record.licensed, Some(true));
        assert_eq!(record.category_id, "10");
        assert_eq!(record.tags, vec!["rick", "astley"]);
        assert_eq!(record.duration_secs, Some(213));

        let stats = video.statistics.unwrap();
        assert_eq!(stats.views, Some(1_500_000_000));
        assert_eq!(stats.likes, Some(17_000_000));
        assert_eq!(stats.comments, None);
    }

    #[test]
    fn test_incomplete_video_is_total() {
        let video = video_record_with_stats(&json!({"id": "abc", "snippet": {}})).unwrap();
        let record = video.record;
        assert_eq!(record.category_id, UNCATEGORIZED);
        assert!(record.tags.is_empty());
        assert!(record.title.is_none());
        assert!(record.licensed.is_none());
        assert!(record.duration_secs.is_none());
        assert!(video.statistics.is_none());
    }

    #[test]
    fn test_missing_id_is_an_error() {
        assert!(matches!(
            video_record(&json!({"snippet": {"title": "x"}})),
            Err(ModelError::MissingField("id"))
        ));
    }

    #[test]
    fn test_playlist_page() {
        let response = json!({
            "nextPageToken": "CAUQAA",
            "items": [
                {
                    "snippet": {
                        "channelId": "UCowner",
                        "videoOwnerChannelId": "UCuploader",
                        "title": "first"
                    },
                    "contentDetails": {"videoId": "vid00000001"}
                },
                {"contentDetails": {"videoId": "vid00000002"}}
            ]
        });

        let page = playlist_page(&response).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("CAUQAA"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id.as_str(), "vid00000001");
        assert_eq!(page.items[0].channel_id.as_deref(), Some("UCuploader"));
        assert_eq!(page.items[1].category_id, UNCATEGORIZED);
    }

    #[test]
    fn test_last_playlist_page_has_no_token() {
        let page = playlist_page(&json!({"items": []})).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());

        let page = playlist_page(&json!({})).unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_channel_record() {
        let item = json!({
            "id": "UCabc",
            "snippet": {"title": "Chan", "customUrl": "@chan"},
            "statistics": {"viewCount": "42", "subscriberCount": "7"}
        });
        let channel = channel_record(&item).unwrap();
        assert_eq!(channel.title.as_deref(), Some("Chan"));
        assert_eq!(channel.custom_url.as_deref(), Some("@chan"));
        assert!(channel.description.is_none());
        assert_eq!(channel.views, Some(42));
        assert_eq!(channel.subscribers, Some(7));
    }

    #[test]
    fn test_video_category() {
        let item = json!({"id": "10", "snippet": {"title": "Music", "assignable": true}});
        let category = video_category(&item, "US").unwrap();
        assert_eq!(category.region_code, "US");
        assert_eq!(category.category_id, "10");
        assert_eq!(category.category_title.as_deref(), Some("Music"));
        assert_eq!(category.assignable, Some(true));
    }
}
