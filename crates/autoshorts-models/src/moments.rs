//! Most-replayed moment models.

use serde::{Deserialize, Serialize};

/// One heatmap segment of a video's "most replayed" signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayMoment {
    pub time_start_ms: u64,
    pub time_end_ms: u64,
    pub duration_ms: u64,
    /// Normalized intensity in `[0, 1]`.
    pub intensity_score: f64,
}

impl ReplayMoment {
    pub fn new(time_start_ms: u64, duration_ms: u64, intensity_score: f64) -> Self {
        Self {
            time_start_ms,
            time_end_ms: time_start_ms.saturating_add(duration_ms),
            duration_ms,
            intensity_score,
        }
    }
}
