//! "Most replayed" heatmap probe.
//!
//! The heatmap is read from a Data API compatible service exposing
//! `videos?part=mostReplayed`. A video without the heatmap is not an error
//! for the pipeline; it surfaces as [`YoutubeError::ReplaySignalAbsent`].

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info_span, Instrument};

use autoshorts_models::json_path::{get_f64, safe_get, safe_get_path, PathKey};
use autoshorts_models::ReplayMoment;

use crate::config::YoutubeConfig;
use crate::error::{YoutubeError, YoutubeResult};
use crate::metrics::record_request;

/// Source of per-video replay heatmaps.
#[async_trait]
pub trait ReplayProbe: Send + Sync {
    /// Heatmap moments in API order.
    ///
    /// Fails with [`YoutubeError::ReplaySignalAbsent`] when the video has no
    /// heatmap.
    async fn probe(&self, video_id: &str) -> YoutubeResult<Vec<ReplayMoment>>;

    /// Whether the video carries a non-empty heatmap.
    async fn has_signal(&self, video_id: &str) -> YoutubeResult<bool> {
        match self.probe(video_id).await {
            Ok(moments) => Ok(!moments.is_empty()),
            Err(YoutubeError::ReplaySignalAbsent(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn millis(value: &Value, key: &str) -> Option<u64> {
    get_f64(value, &[key]).filter(|v| *v >= 0.0).map(|v| v as u64)
}

/// Parse a `mostReplayed` response body into moments.
///
/// Every moment gets the same duration: the start offset of the second
/// marker, which equals the marker width when markers are evenly spaced
/// from zero. A lone marker uses its own `durationMillis`, or 0. Responses
/// in the older `heatMarkers` shape carry a per-marker duration, which is
/// used as is.
pub fn parse_replay_response(video_id: &str, body: &Value) -> YoutubeResult<Vec<ReplayMoment>> {
    let absent = || YoutubeError::ReplaySignalAbsent(video_id.to_string());

    if safe_get(body, &["error"]).is_some() {
        return Err(absent());
    }

    let most_replayed = safe_get_path(
        body,
        &[PathKey::Key("items"), PathKey::Index(0), PathKey::Key("mostReplayed")],
    )
    .filter(|v| !v.is_null())
    .ok_or_else(absent)?;

    if let Some(markers) = safe_get(most_replayed, &["markers"]).and_then(Value::as_array) {
        if markers.is_empty() {
            return Err(absent());
        }
        let shared_duration = match markers.get(1) {
            Some(second) => millis(second, "startMillis"),
            None => millis(&markers[0], "durationMillis"),
        }
        .unwrap_or(0);

        return markers
            .iter()
            .map(|marker| {
                let start = millis(marker, "startMillis").ok_or_else(|| {
                    YoutubeError::invalid_response(format!(
                        "marker without startMillis for video {video_id}"
                    ))
                })?;
                let intensity = get_f64(marker, &["intensityScoreNormalized"]).unwrap_or(0.0);
                Ok(ReplayMoment::new(start, shared_duration, intensity))
            })
            .collect();
    }

    if let Some(markers) = safe_get(most_replayed, &["heatMarkers"]).and_then(Value::as_array) {
        if markers.is_empty() {
            return Err(absent());
        }
        return markers
            .iter()
            .map(|marker| {
                let renderer = safe_get(marker, &["heatMarkerRenderer"]).unwrap_or(marker);
                let start = millis(renderer, "timeRangeStartMillis").ok_or_else(|| {
                    YoutubeError::invalid_response(format!(
                        "heat marker without timeRangeStartMillis for video {video_id}"
                    ))
                })?;
                let duration = millis(renderer, "markerDurationMillis").unwrap_or(0);
                let intensity =
                    get_f64(renderer, &["heatMarkerIntensityScoreNormalized"]).unwrap_or(0.0);
                Ok(ReplayMoment::new(start, duration, intensity))
            })
            .collect();
    }

    Err(absent())
}

/// HTTP implementation against a `mostReplayed`-capable endpoint.
#[derive(Clone)]
pub struct LemnosLifeReplayClient {
    http: Client,
    base_url: String,
}

impl LemnosLifeReplayClient {
    pub fn new(config: &YoutubeConfig) -> YoutubeResult<Self> {
        Ok(Self::with_http(config.http_client()?, config))
    }

    pub fn with_http(http: Client, config: &YoutubeConfig) -> Self {
        Self {
            http,
            base_url: config.replay_api_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, video_id: &str) -> YoutubeResult<Value> {
        let response = self
            .http
            .get(format!("{}/videos", self.base_url))
            .query(&[("part", "mostReplayed"), ("id", video_id)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        // "No data" is reported as a JSON `error` object, sometimes with a
        // non-2xx status; let the parser classify it.
        match serde_json::from_str::<Value>(&body) {
            Ok(value) if status.is_success() || value.get("error").is_some() => Ok(value),
            Ok(_) => Err(YoutubeError::api(status.as_u16(), body)),
            Err(_) if !status.is_success() => Err(YoutubeError::api(status.as_u16(), body)),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ReplayProbe for LemnosLifeReplayClient {
    async fn probe(&self, video_id: &str) -> YoutubeResult<Vec<ReplayMoment>> {
        let span = info_span!("replay_probe", video_id = %video_id);
        let start = Instant::now();

        let result = async {
            let body = self.fetch(video_id).await?;
            parse_replay_response(video_id, &body)
        }
        .instrument(span)
        .await;

        let status = match &result {
            Ok(_) | Err(YoutubeError::ReplaySignalAbsent(_)) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request("replay_api", "probe", status, start.elapsed().as_millis() as f64);

        if let Ok(moments) = &result {
            debug!(video_id = %video_id, moments = moments.len(), "Replay heatmap found");
        }
        result
    }
}
