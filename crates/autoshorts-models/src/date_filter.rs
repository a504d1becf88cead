//! Publication date window filtering.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::video::{VideoRecord, VideoRecordWithStats};

/// Anything carrying a platform publication timestamp.
pub trait Published {
    /// Raw ISO-8601 timestamp, if known.
    fn published_at(&self) -> Option<&str>;

    fn published_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl Published for VideoRecord {
    fn published_at(&self) -> Option<&str> {
        self.published_at.as_deref()
    }
}

impl Published for VideoRecordWithStats {
    fn published_at(&self) -> Option<&str> {
        self.record.published_at.as_deref()
    }
}

/// Inclusive publication window; either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateWindow {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// Build a window from optional `YYYY-MM-DD` bounds.
    pub fn from_dates(from: Option<&str>, to: Option<&str>) -> ModelResult<Self> {
        Ok(Self {
            from: from.map(parse_date_bound).transpose()?,
            to: to.map(parse_date_bound).transpose()?,
        })
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Whether a timestamp falls inside the window. Unknown timestamps never
    /// match a bounded window.
    pub fn contains(&self, published: Option<DateTime<Utc>>) -> bool {
        if self.is_open() {
            return true;
        }
        let Some(ts) = published else {
            return false;
        };
        self.from.map_or(true, |from| ts >= from) && self.to.map_or(true, |to| ts <= to)
    }
}

/// Parse a user-supplied `YYYY-MM-DD` bound as midnight UTC.
pub fn parse_date_bound(value: &str) -> ModelResult<DateTime<Utc>> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ModelError::InvalidDate(value.to_string()))
}

/// Keep the records published inside the window, preserving order.
///
/// An open window returns the input unchanged.
pub fn select_by_date<T: Published>(records: Vec<T>, window: &DateWindow) -> Vec<T> {
    if window.is_open() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| window.contains(r.published_at_utc()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, published: Option<&str>) -> VideoRecord {
        let mut record = VideoRecord::new(id);
        record.published_at = published.map(str::to_owned);
        record
    }

    fn fixture() -> Vec<VideoRecord> {
        vec![
            video("a", Some("2024-01-01T00:00:00Z")),
            video("b", Some("2024-01-15T08:30:00Z")),
            video("c", None),
            video("d", Some("2024-02-01T00:00:00Z")),
            video("e", Some("garbage")),
            video("f", Some("2023-12-31T23:59:59Z")),
        ]
    }

    fn ids(records: &[VideoRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_open_window_returns_input_unchanged() {
        let out = select_by_date(fixture(), &DateWindow::default());
        assert_eq!(out, fixture());
    }

    #[test]
    fn test_closed_window_is_inclusive() {
        let window = DateWindow::from_dates(Some("2024-01-01"), Some("2024-02-01")).unwrap();
        let out = select_by_date(fixture(), &window);
        assert_eq!(ids(&out), vec!["a", "b", "d"]);
    }

    #[test]
    fn test_half_open_windows() {
        let from_only = DateWindow::from_dates(Some("2024-01-02"), None).unwrap();
        assert_eq!(ids(&select_by_date(fixture(), &from_only)), vec!["b", "d"]);

        let to_only = DateWindow::from_dates(None, Some("2024-01-01")).unwrap();
        assert_eq!(ids(&select_by_date(fixture(), &to_only)), vec!["a", "f"]);
    }

    #[test]
    fn test_offset_timestamps_compare_in_utc() {
        let records = vec![video("x", Some("2024-01-01T01:00:00+02:00"))];
        let window = DateWindow::from_dates(Some("2024-01-01"), None).unwrap();
        assert!(select_by_date(records, &window).is_empty());
    }

    #[test]
    fn test_parse_date_bound() {
        let ts = parse_date_bound("2024-03-05").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-05T00:00:00+00:00");
        assert!(matches!(
            parse_date_bound("05/03/2024"),
            Err(ModelError::InvalidDate(_))
        ));
    }
}
