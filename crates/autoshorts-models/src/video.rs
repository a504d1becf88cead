//! Video metadata models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned when the platform reports none.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Platform video identifier (11 characters for YouTube).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalized video metadata.
///
/// Every field except `id` may be absent in the upstream payload;
/// `category_id` falls back to [`UNCATEGORIZED`] and `tags` to an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: VideoId,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub audio_language: Option<String>,
    pub licensed: Option<bool>,
    pub description: Option<String>,
    /// ISO-8601 timestamp as reported by the platform.
    pub published_at: Option<String>,
    pub category_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub title: Option<String>,
    /// Parsed from `contentDetails.duration`; absent for playlist items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

impl VideoRecord {
    /// Minimal record carrying only an id.
    pub fn new(id: impl Into<VideoId>) -> Self {
        Self {
            id: id.into(),
            channel_id: None,
            channel_title: None,
            audio_language: None,
            licensed: None,
            description: None,
            published_at: None,
            category_id: UNCATEGORIZED.to_string(),
            tags: Vec::new(),
            title: None,
            duration_secs: None,
        }
    }
}

/// Engagement counters. `None` means the platform did not report the
/// counter, which is distinct from zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStatistics {
    pub comments: Option<u64>,
    pub likes: Option<u64>,
    pub views: Option<u64>,
}

/// A video record plus the statistics, when the statistics call succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecordWithStats {
    #[serde(flatten)]
    pub record: VideoRecord,
    pub statistics: Option<VideoStatistics>,
}

impl VideoRecordWithStats {
    pub fn without_stats(record: VideoRecord) -> Self {
        Self {
            record,
            statistics: None,
        }
    }

    pub fn id(&self) -> &VideoId {
        &self.record.id
    }
}

impl From<VideoRecord> for VideoRecordWithStats {
    fn from(record: VideoRecord) -> Self {
        Self::without_stats(record)
    }
}

/// Parse an ISO-8601 duration such as `PT1H2M3S` or `P1DT5M` into seconds.
///
/// Only day, hour, minute and second designators are supported; anything
/// else (including fractional values) yields `None`.
pub fn parse_iso8601_duration(value: &str) -> Option<u64> {
    let rest = value.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    let mut total = 0u64;
    let mut seen_any = false;

    let mut accumulate = |part: &str, units: &[(char, u64)]| -> Option<()> {
        let mut digits = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let (_, factor) = units.iter().find(|(unit, _)| *unit == c)?;
            let n: u64 = digits.parse().ok()?;
            total = total.checked_add(n.checked_mul(*factor)?)?;
            digits.clear();
            seen_any = true;
        }
        digits.is_empty().then_some(())
    };

    accumulate(date_part, &[('D', 86_400)])?;
    if let Some(time) = time_part {
        if time.is_empty() {
            return None;
        }
        accumulate(time, &[('H', 3_600), ('M', 60), ('S', 1)])?;
    }

    seen_any.then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_display_and_from() {
        let id = VideoId::from("dQw4w9WgXcQ");
        assert_eq!(id.to_string(), "dQw4w9WgXcQ");
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(VideoId::from_string(String::from("x")), VideoId::from("x"));
    }

    #[test]
    fn test_new_record_defaults() {
        let record = VideoRecord::new("abc");
        assert_eq!(record.category_id, UNCATEGORIZED);
        assert!(record.tags.is_empty());
        assert!(record.channel_id.is_none());
    }

    #[test]
    fn test_record_with_stats_serializes_flat() {
        let mut record = VideoRecord::new("abc");
        record.title = Some("Title".into());
        let with_stats = VideoRecordWithStats {
            record,
            statistics: Some(VideoStatistics {
                comments: None,
                likes: Some(3),
                views: Some(10),
            }),
        };

        let json = serde_json::to_value(&with_stats).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["title"], "Title");
        assert_eq!(json["statistics"]["likes"], 3);
        assert!(json["statistics"]["comments"].is_null());
        assert!(json.get("duration_secs").is_none());

        let back: VideoRecordWithStats = serde_json::from_value(json).unwrap();
        assert_eq!(back, with_stats);
    }

    #[test]
    fn test_parse_iso8601_duration() {
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("PT1M"), Some(60));
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso8601_duration("P1DT1S"), Some(86_401));
        assert_eq!(parse_iso8601_duration("P0D"), Some(0));
        assert_eq!(parse_iso8601_duration("PT"), None);
        assert_eq!(parse_iso8601_duration("P"), None);
        assert_eq!(parse_iso8601_duration("1H"), None);
        assert_eq!(parse_iso8601_duration("PT1.5S"), None);
        assert_eq!(parse_iso8601_duration("PT12"), None);
    }
}
