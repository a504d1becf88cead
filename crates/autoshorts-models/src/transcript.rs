//! Transcript models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key suffix used for auto-generated tracks.
const AUTOMATIC_SUFFIX: &str = "_automatic";

/// One timed caption line, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptItem {
    pub time_start_s: f64,
    pub time_end_s: f64,
    pub duration_s: f64,
    pub text: String,
}

impl TranscriptItem {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            time_start_s: start,
            time_end_s: start + duration,
            duration_s: duration,
            text: text.into(),
        }
    }
}

/// A language a track can be translated into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub language_code: String,
    pub language: String,
}

/// A single caption track and its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptTrack {
    pub language_code: String,
    pub language: String,
    pub is_generated: bool,
    pub is_translatable: bool,
    #[serde(default)]
    pub translation_languages: Vec<Language>,
    pub items: Vec<TranscriptItem>,
}

impl TranscriptTrack {
    /// Key under which this track is stored in a [`TranscriptSet`].
    pub fn key(&self) -> String {
        TranscriptSet::language_key(&self.language_code, self.is_generated)
    }
}

/// All tracks of one video, keyed by language code.
///
/// Auto-generated tracks use `"{code}_automatic"` so a manual and a
/// generated track for the same language never collide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranscriptSet {
    tracks: BTreeMap<String, TranscriptTrack>,
}

impl TranscriptSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language_key(language_code: &str, is_generated: bool) -> String {
        if is_generated {
            format!("{language_code}{AUTOMATIC_SUFFIX}")
        } else {
            language_code.to_string()
        }
    }

    /// Insert a track under its key, returning any track it replaced.
    pub fn insert(&mut self, track: TranscriptTrack) -> Option<TranscriptTrack> {
        self.tracks.insert(track.key(), track)
    }

    pub fn get(&self, key: &str) -> Option<&TranscriptTrack> {
        self.tracks.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &TranscriptTrack> {
        self.tracks.values()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl FromIterator<TranscriptTrack> for TranscriptSet {
    fn from_iter<I: IntoIterator<Item = TranscriptTrack>>(iter: I) -> Self {
        let mut set = Self::new();
        for track in iter {
            set.insert(track);
        }
        set
    }
}
