//! Caption track fetching.
//!
//! Tracks are discovered through the innertube player endpoint:
//! 1. Fetch the watch page and read `INNERTUBE_API_KEY`
//! 2. POST the player request and read `captions.playerCaptionsTracklistRenderer`
//! 3. Fetch each track's timed text XML
//!
//! A video without caption tracks yields [`YoutubeError::TranscriptsDisabled`].

use std::collections::BTreeSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info_span, Instrument};

use autoshorts_models::json_path::{get_bool, get_string, safe_get, safe_get_path, PathKey};
use autoshorts_models::{Language, TranscriptItem, TranscriptSet, TranscriptTrack};

use crate::config::YoutubeConfig;
use crate::error::{YoutubeError, YoutubeResult};

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).unwrap()
});
static TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)").unwrap());
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Source of per-video transcripts.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// All caption tracks of a video, keyed by language.
    async fn fetch_transcripts(&self, video_id: &str) -> YoutubeResult<TranscriptSet>;
}

/// A caption track before its text has been fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    pub language: String,
    pub is_generated: bool,
    pub is_translatable: bool,
}

/// Tracks advertised by the player response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionListing {
    pub tracks: Vec<CaptionTrack>,
    pub translation_languages: Vec<Language>,
}

fn first_run_text(value: &Value, key: &str) -> Option<String> {
    safe_get_path(
        value,
        &[PathKey::Key(key), PathKey::Key("runs"), PathKey::Index(0), PathKey::Key("text")],
    )
    .and_then(Value::as_str)
    .map(str::to_owned)
    .or_else(|| get_string(value, &[key, "simpleText"]))
}

/// Read the caption tracks out of an innertube player response.
pub fn parse_caption_listing(video_id: &str, player: &Value) -> YoutubeResult<CaptionListing> {
    if let Some(status) = get_string(player, &["playabilityStatus", "status"]) {
        if status == "ERROR" {
            return Err(YoutubeError::VideoNotFound(video_id.to_string()));
        }
        if status != "OK" {
            let reason = get_string(player, &["playabilityStatus", "reason"]).unwrap_or_default();
            return Err(YoutubeError::invalid_response(format!(
                "video {video_id} is not playable ({status}): {reason}"
            )));
        }
    }

    let renderer = safe_get(player, &["captions", "playerCaptionsTracklistRenderer"])
        .ok_or_else(|| YoutubeError::TranscriptsDisabled(video_id.to_string()))?;

    let translation_languages = safe_get(renderer, &["translationLanguages"])
        .and_then(Value::as_array)
        .map(|langs| {
            langs
                .iter()
                .filter_map(|lang| {
                    Some(Language {
                        language_code: get_string(lang, &["languageCode"])?,
                        language: first_run_text(lang, "languageName")?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let tracks: Vec<CaptionTrack> = safe_get(renderer, &["captionTracks"])
        .and_then(Value::as_array)
        .map(|tracks| {
            tracks
                .iter()
                .filter_map(|track| {
                    let language_code = get_string(track, &["languageCode"])?;
                    let base_url = get_string(track, &["baseUrl"])?.replace("&fmt=srv3", "");
                    Some(CaptionTrack {
                        language: first_run_text(track, "name")
                            .unwrap_or_else(|| language_code.clone()),
                        is_generated: get_string(track, &["kind"]).as_deref() == Some("asr"),
                        is_translatable: get_bool(track, &["isTranslatable"]).unwrap_or(false),
                        base_url,
                        language_code,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(YoutubeError::TranscriptsDisabled(video_id.to_string()));
    }

    Ok(CaptionListing {
        tracks,
        translation_languages,
    })
}

/// Base language of a code, `en` for `en-GB`.
fn base_language(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code)
}

/// Generated tracks must agree on one base language.
pub fn check_base_languages(video_id: &str, tracks: &[CaptionTrack]) -> YoutubeResult<()> {
    let codes: BTreeSet<&str> = tracks
        .iter()
        .filter(|t| t.is_generated)
        .map(|t| base_language(&t.language_code))
        .collect();

    if codes.len() > 1 {
        return Err(YoutubeError::InconsistentBaseLanguage {
            video_id: video_id.to_string(),
            codes: codes.into_iter().map(str::to_owned).collect(),
        });
    }
    Ok(())
}

/// Parse timed text XML (`<text start=".." dur="..">..</text>`) into items.
///
/// Entities are decoded and inline markup is stripped; entries without a
/// parsable start are skipped.
pub fn parse_timed_text(xml: &str) -> Vec<TranscriptItem> {
    TEXT_RE
        .captures_iter(xml)
        .filter_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            let mut start = None;
            let mut duration = 0.0;
            for attr in ATTR_RE.captures_iter(attrs) {
                match &attr[1] {
                    "start" => start = attr[2].parse::<f64>().ok(),
                    "dur" => duration = attr[2].parse::<f64>().unwrap_or(0.0),
                    _ => {}
                }
            }

            let raw = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let decoded = html_escape::decode_html_entities(raw);
            let text = TAG_RE.replace_all(&decoded, "");
            Some(TranscriptItem::new(start?, duration, text.trim()))
        })
        .collect()
}

/// Innertube-backed transcript source.
#[derive(Clone)]
pub struct InnertubeTranscriptClient {
    http: Client,
    watch_url: String,
    strict_languages: bool,
}

impl InnertubeTranscriptClient {
    pub fn new(config: &YoutubeConfig) -> YoutubeResult<Self> {
        Ok(Self::with_http(config.http_client()?, config))
    }

    pub fn with_http(http: Client, config: &YoutubeConfig) -> Self {
        Self {
            http,
            watch_url: config.watch_url.trim_end_matches('/').to_string(),
            strict_languages: config.strict_transcript_languages,
        }
    }

    async fn get_text(&self, request: reqwest::RequestBuilder) -> YoutubeResult<String> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YoutubeError::api(status.as_u16(), body));
        }
        Ok(response.text().await?)
    }

    async fn api_key(&self, video_id: &str) -> YoutubeResult<String> {
        let html = self
            .get_text(
                self.http
                    .get(format!("{}/watch", self.watch_url))
                    .query(&[("v", video_id)]),
            )
            .await?;

        API_KEY_RE
            .captures(&html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                YoutubeError::invalid_response(format!(
                    "watch page for {video_id} has no INNERTUBE_API_KEY"
                ))
            })
    }

    async fn player_response(&self, video_id: &str, api_key: &str) -> YoutubeResult<Value> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let text = self
            .get_text(
                self.http
                    .post(format!("{}/youtubei/v1/player", self.watch_url))
                    .query(&[("key", api_key)])
                    .json(&body),
            )
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn fetch_track(
        &self,
        track: &CaptionTrack,
        translation_languages: &[Language],
    ) -> YoutubeResult<TranscriptTrack> {
        let xml = self.get_text(self.http.get(&track.base_url)).await?;
        Ok(TranscriptTrack {
            language_code: track.language_code.clone(),
            language: track.language.clone(),
            is_generated: track.is_generated,
            is_translatable: track.is_translatable,
            translation_languages: if track.is_translatable {
                translation_languages.to_vec()
            } else {
                Vec::new()
            },
            items: parse_timed_text(&xml),
        })
    }
}

#[async_trait]
impl TranscriptSource for InnertubeTranscriptClient {
    async fn fetch_transcripts(&self, video_id: &str) -> YoutubeResult<TranscriptSet> {
        let span = info_span!("fetch_transcripts", video_id = %video_id);
        async {
            let api_key = self.api_key(video_id).await?;
            let player = self.player_response(video_id, &api_key).await?;
            let listing = parse_caption_listing(video_id, &player)?;
            if self.strict_languages {
                check_base_languages(video_id, &listing.tracks)?;
            }

            let mut set = TranscriptSet::new();
            for track in &listing.tracks {
                set.insert(self.fetch_track(track, &listing.translation_languages).await?);
            }
            debug!(video_id = %video_id, tracks = set.len(), "Fetched transcripts");
            Ok::<_, YoutubeError>(set)
        }
        .instrument(span)
        .await
    }
}
