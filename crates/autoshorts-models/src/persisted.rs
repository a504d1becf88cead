//! Database projection of a downloaded video.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::video::VideoRecordWithStats;

/// Row written to the `videos` table once a video has been uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedVideoRow {
    pub id: String,
    pub audio_language: Option<String>,
    pub licensed: Option<bool>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Comma-joined tags.
    pub tags: String,
    pub title: Option<String>,
    pub category_id: String,
    pub channel_id: Option<String>,
    pub storage_path: String,
    pub comments: Option<i64>,
    pub likes: Option<i64>,
    pub views: Option<i64>,
}

impl PersistedVideoRow {
    pub fn from_record(video: &VideoRecordWithStats, storage_path: impl Into<String>) -> Self {
        let record = &video.record;
        let stats = video.statistics.clone().unwrap_or_default();
        Self {
            id: record.id.to_string(),
            audio_language: record.audio_language.clone(),
            licensed: record.licensed,
            description: record.description.clone(),
            published_at: record
                .published_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            tags: record.tags.join(","),
            title: record.title.clone(),
            category_id: record.category_id.clone(),
            channel_id: record.channel_id.clone(),
            storage_path: storage_path.into(),
            comments: stats.comments.and_then(to_column),
            likes: stats.likes.and_then(to_column),
            views: stats.views.and_then(to_column),
        }
    }
}

fn to_column(count: u64) -> Option<i64> {
    i64::try_from(count).ok()
}
